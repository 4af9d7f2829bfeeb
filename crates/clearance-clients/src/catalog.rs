//! Catalog client
//!
//! Reads the authoritative product record and writes tier, scheme, category
//! and price changes back to the catalog service.
//!
//! The catalog's PATCH endpoint replaces the whole record, so every update
//! is rebuilt from the attributes captured at fetch time.

use crate::http::{ensure_success, read_json, transport_error};
use crate::{normalize_base_url, ClientError};
use async_trait::async_trait;
use clearance_domain::{
    parse_anchor_date, CatalogSource, CollaboratorError, CostScheme, ProductState, TierValue,
    UpdatePlan,
};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

/// Default timeout for catalog requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Attributes copied verbatim into every update payload
const PASS_THROUGH_FIELDS: [&str; 9] = [
    "nombre",
    "id_marca",
    "id_genero",
    "id_tipo_producto",
    "retail_val",
    "retail_mto",
    "penalizacion_orden",
    "id_subtipo_producto",
    "descuentos_automaticos",
];

/// HTTP client for the catalog service
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a client with the default timeout
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            token: token.into(),
            client,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn product_url(&self, sku: &str) -> String {
        format!("{}/empleados/productos/{}", self.base_url, sku)
    }

    fn categories_url(&self, sku: &str) -> String {
        format!("{}/empleados/categorias_productos/{}", self.base_url, sku)
    }

    fn price_url(&self, sku: &str) -> String {
        format!(
            "{}/empleados/productos/{}/actions/actualizar_precio",
            self.base_url, sku
        )
    }
}

/// Parse a catalog record into a product state
///
/// The record may be wrapped in a `data` object. The full record is kept in
/// [`ProductState::attributes`] for later payload rebuilding.
pub fn parse_record(sku: &str, body: Value) -> Result<ProductState, CollaboratorError> {
    let record = match body {
        Value::Object(mut outer) => match outer.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                outer.insert("data".to_string(), other);
                outer
            }
            None => outer,
        },
        other => {
            return Err(CollaboratorError::InvalidResponse(format!(
                "Expected a product object for {}, got {}",
                sku, other
            )))
        }
    };

    let current_tier = match record.get("id_descuento").and_then(Value::as_str) {
        Some(label) => TierValue::from_label(label),
        None => TierValue::default(),
    };
    let current_scheme = record
        .get("id_esq_costo")
        .and_then(Value::as_str)
        .map(CostScheme::new)
        .unwrap_or_default();
    let last_auto_discount_update = record
        .get("ult_actualizacion_descuento_automatico")
        .and_then(Value::as_str)
        .and_then(parse_anchor_date);
    let auto_discount_enabled = record
        .get("descuentos_automaticos")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let categories = id_list(record.get("categorias"), "id_categoria")
        .into_iter()
        .filter_map(|id| match id {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();

    Ok(ProductState {
        sku: sku.to_string(),
        current_tier,
        current_scheme,
        last_auto_discount_update,
        auto_discount_enabled,
        categories,
        attributes: record,
    })
}

/// Build the PATCH body for an update plan
pub fn build_update_payload(state: &ProductState, plan: &UpdatePlan) -> Value {
    let attributes = &state.attributes;
    let mut payload = Map::new();

    for field in PASS_THROUGH_FIELDS {
        payload.insert(
            field.to_string(),
            attributes.get(field).cloned().unwrap_or(Value::Null),
        );
    }

    payload.insert("valid_web".to_string(), Value::Bool(false));
    payload.insert(
        "id_esq_costo".to_string(),
        Value::String(plan.final_scheme.to_string()),
    );
    payload.insert(
        "id_descuento".to_string(),
        Value::String(plan.next_tier.to_string()),
    );
    payload.insert(
        "generos".to_string(),
        Value::Array(id_list(attributes.get("generos"), "id_genero")),
    );
    payload.insert(
        "productos_listas_precios".to_string(),
        Value::Array(id_list(
            attributes.get("productos_listas_precios"),
            "id_lista_precio",
        )),
    );
    payload.insert(
        "ids_conjunto_categoria".to_string(),
        Value::Array(id_list(
            attributes.get("conjunto_categorias"),
            "id_conjunto_categoria",
        )),
    );
    payload.insert(
        "ids_silueta".to_string(),
        Value::Array(id_list(attributes.get("siluetas"), "id_silueta")),
    );

    if let Some(date) = plan.refresh_date {
        payload.insert(
            "ult_actualizacion_descuento_automatico".to_string(),
            Value::String(date.format("%Y-%m-%d").to_string()),
        );
    }

    Value::Object(payload)
}

/// Extract ids from a list of objects carrying `field`
///
/// The first entry decides the shape: a list of plain ids is passed
/// through unchanged.
fn id_list(value: Option<&Value>, field: &str) -> Vec<Value> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    if !matches!(items.first(), Some(Value::Object(_))) {
        return items.clone();
    }

    items
        .iter()
        .filter_map(|item| item.get(field).filter(|id| is_present(id)).cloned())
        .collect()
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_product(&self, sku: &str) -> Result<ProductState, CollaboratorError> {
        let response = self
            .client
            .get(self.product_url(sku))
            .header("token", &self.token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, sku, false).await?;
        parse_record(sku, read_json(response).await?)
    }

    async fn apply_update(
        &self,
        state: &ProductState,
        plan: &UpdatePlan,
    ) -> Result<(), CollaboratorError> {
        let payload = build_update_payload(state, plan);
        debug!(sku = %plan.sku, tier = %plan.next_tier, scheme = %plan.final_scheme, "patching product");

        let response = self
            .client
            .patch(self.product_url(&plan.sku))
            .header("token", &self.token)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        ensure_success(response, &plan.sku, true).await?;
        Ok(())
    }

    async fn update_categories(
        &self,
        sku: &str,
        categories: &[String],
    ) -> Result<(), CollaboratorError> {
        let response = self
            .client
            .put(self.categories_url(sku))
            .header("token", &self.token)
            .json(&json!({ "id_categorias": categories }))
            .send()
            .await
            .map_err(transport_error)?;

        ensure_success(response, sku, true).await?;
        Ok(())
    }

    async fn trigger_price_recalculation(&self, sku: &str) -> Result<(), CollaboratorError> {
        let response = self
            .client
            .post(self.price_url(sku))
            .header("token", &self.token)
            .send()
            .await
            .map_err(transport_error)?;

        ensure_success(response, sku, true).await?;
        Ok(())
    }
}
