use crate::domain::model::{normalize_zip, Dimensions, ShipmentRequest};
use crate::domain::ports::{ProductLookup, SupplierLookup, ZipLookup};
use crate::utils::error::{RateError, Result};

/// Caller-supplied state wins; otherwise look the ZIP up.
pub fn resolve_state<Z: ZipLookup + ?Sized>(
    zips: &Z,
    zip: &str,
    given: Option<String>,
) -> Option<String> {
    given
        .filter(|s| !s.trim().is_empty())
        .or_else(|| zips.locate(zip).ok().map(|loc| loc.state_code.clone()))
}

/// Shipment from directly entered values.
pub fn direct_shipment<Z: ZipLookup + ?Sized>(
    zips: &Z,
    origin_zip: &str,
    dest_zip: &str,
    weight_lb: f64,
    dimensions: Dimensions,
    origin_state: Option<String>,
    dest_state: Option<String>,
) -> Result<ShipmentRequest> {
    let shipment = ShipmentRequest::new(origin_zip, dest_zip, weight_lb, dimensions)?;
    let origin_state = resolve_state(zips, shipment.origin_zip(), origin_state);
    let dest_state = resolve_state(zips, shipment.dest_zip(), dest_state);
    Ok(shipment.with_states(origin_state, dest_state))
}

/// Shipment for a catalog product. The product's own ZIP is the origin;
/// products without one ship from their supplier.
pub fn product_shipment<P, S, Z>(
    products: &P,
    suppliers: &S,
    zips: &Z,
    product_number: &str,
    dest_zip: &str,
    dest_state: Option<String>,
) -> Result<ShipmentRequest>
where
    P: ProductLookup + ?Sized,
    S: SupplierLookup + ?Sized,
    Z: ZipLookup + ?Sized,
{
    let product = products.product(product_number)?;

    let origin_zip = if product.zip.trim().is_empty() {
        suppliers
            .supplier_zip(&product.supplier_code)
            .map_err(|_| RateError::not_found("Origin ZIP for supplier", &product.supplier_code))?
            .to_string()
    } else {
        normalize_zip(&product.zip)
    };

    tracing::debug!(
        "Product {} ships from {} (supplier {})",
        product.product_number,
        origin_zip,
        product.supplier_code
    );

    let shipment = ShipmentRequest::from_product(product, &origin_zip, dest_zip)?;
    let origin_state = resolve_state(zips, shipment.origin_zip(), None);
    let dest_state = resolve_state(zips, shipment.dest_zip(), dest_state);
    Ok(shipment.with_states(origin_state, dest_state))
}
