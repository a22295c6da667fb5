//! CSV-backed reference data, loaded once into immutable maps.

use crate::domain::model::{normalize_zip, Product, Supplier, ZipLocation};
use crate::domain::ports::{ProductLookup, SupplierLookup, ZipLookup};
use crate::utils::error::{RateError, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| RateError::Config {
        message: format!("cannot open reference file {}: {}", path.display(), e),
    })
}

#[derive(Debug, Clone, Default)]
pub struct ZipDirectory {
    by_zip: HashMap<String, ZipLocation>,
}

impl ZipDirectory {
    pub fn from_locations(locations: Vec<ZipLocation>) -> Self {
        let by_zip = locations
            .into_iter()
            .map(|mut loc| {
                loc.zip = normalize_zip(&loc.zip);
                loc.state_code = loc.state_code.trim().to_ascii_uppercase();
                (loc.zip.clone(), loc)
            })
            .collect();
        Self { by_zip }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_locations(read_rows(reader)?))
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let directory = Self::from_reader(open(path.as_ref())?)?;
        tracing::info!(
            "Loaded {} ZIP locations from {}",
            directory.len(),
            path.as_ref().display()
        );
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.by_zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_zip.is_empty()
    }
}

impl ZipLookup for ZipDirectory {
    fn locate(&self, zip: &str) -> Result<&ZipLocation> {
        let key = normalize_zip(zip);
        self.by_zip
            .get(&key)
            .ok_or_else(|| RateError::not_found("ZIP code", key))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SupplierDirectory {
    zip_by_code: HashMap<String, String>,
}

impl SupplierDirectory {
    pub fn from_suppliers(suppliers: Vec<Supplier>) -> Self {
        let zip_by_code = suppliers
            .into_iter()
            .map(|s| (s.supplier_code.trim().to_string(), normalize_zip(&s.zip)))
            .collect();
        Self { zip_by_code }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_suppliers(read_rows(reader)?))
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let directory = Self::from_reader(open(path.as_ref())?)?;
        tracing::info!(
            "Loaded {} suppliers from {}",
            directory.len(),
            path.as_ref().display()
        );
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.zip_by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip_by_code.is_empty()
    }
}

impl SupplierLookup for SupplierDirectory {
    fn supplier_zip(&self, supplier_code: &str) -> Result<&str> {
        self.zip_by_code
            .get(supplier_code.trim())
            .map(String::as_str)
            .ok_or_else(|| RateError::not_found("Supplier", supplier_code.trim()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    by_number: HashMap<String, Product>,
}

impl ProductCatalog {
    pub fn from_products(products: Vec<Product>) -> Self {
        let by_number = products
            .into_iter()
            .map(|p| (p.product_number.trim().to_string(), p))
            .collect();
        Self { by_number }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_products(read_rows(reader)?))
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let catalog = Self::from_reader(open(path.as_ref())?)?;
        tracing::info!(
            "Loaded {} products from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

impl ProductLookup for ProductCatalog {
    fn product(&self, product_number: &str) -> Result<&Product> {
        self.by_number
            .get(product_number.trim())
            .ok_or_else(|| RateError::not_found("Product", product_number.trim()))
    }
}
