//! Product catalog service.

use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use rust_decimal::Decimal;
use tracing::instrument;

use lapshop_core::ProductId;

use crate::error::ApiError;
use crate::http::{ApiClient, MultipartPart, RequestBody};
use crate::http::response::decode_page;
use crate::types::{Page, Product, ProductInput};

/// Sort orders accepted by `/products/filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Newest,
    BestSelling,
}

impl ProductSort {
    const fn as_param(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
            Self::BestSelling => "best_selling",
        }
    }
}

/// Filter parameters for `/products/filter`. Factories and targets are
/// repeated query parameters; everything else is optional.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub factories: Vec<String>,
    pub targets: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub keyword: Option<String>,
    pub sort: Option<ProductSort>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl ProductFilter {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        for factory in &self.factories {
            query.push(("factory".to_string(), factory.clone()));
        }
        for target in &self.targets {
            query.push(("target".to_string(), target.clone()));
        }
        if let Some(min) = self.price_min {
            query.push(("priceMin".to_string(), min.to_string()));
        }
        if let Some(max) = self.price_max {
            query.push(("priceMax".to_string(), max.to_string()));
        }
        if let Some(keyword) = &self.keyword {
            query.push(("keyword".to_string(), keyword.clone()));
        }
        if let Some(sort) = self.sort {
            query.push(("sort".to_string(), sort.as_param().to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size".to_string(), size.to_string()));
        }
        query
    }
}

/// Product endpoints. Product-by-id and factory reads are cached for
/// 5 minutes; admin mutations invalidate.
#[derive(Clone)]
pub struct ProductsApi {
    client: ApiClient,
    product_cache: Cache<i64, Product>,
    factories_cache: Cache<(), Vec<String>>,
}

impl ProductsApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            product_cache: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(300)) // 5 minutes
                .build(),
            factories_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(300))
                .build(),
        }
    }

    /// `GET /products` - paged listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, size: u64) -> Result<Page<Product>, ApiError> {
        let query = vec![
            ("page".to_string(), page.to_string()),
            ("size".to_string(), size.to_string()),
        ];
        let value: serde_json::Value = self.client.get_json("products", &query).await?;
        decode_page(value)
    }

    /// `GET /products/filter`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, filter))]
    pub async fn filter(&self, filter: &ProductFilter) -> Result<Page<Product>, ApiError> {
        let value: serde_json::Value = self
            .client
            .get_json("products/filter", &filter.to_query())
            .await?;
        decode_page(value)
    }

    /// `GET /products/factories` - the distinct manufacturer list, cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn factories(&self) -> Result<Vec<String>, ApiError> {
        if let Some(cached) = self.factories_cache.get(&()).await {
            return Ok(cached);
        }
        let factories: Vec<String> = self.client.get_json("products/factories", &[]).await?;
        self.factories_cache.insert((), factories.clone()).await;
        Ok(factories)
    }

    /// `GET /products/{id}`, cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(cached) = self.product_cache.get(&id.as_i64()).await {
            return Ok(cached);
        }
        let product: Product = self
            .client
            .get_json(&format!("products/{id}"), &[])
            .await?;
        self.product_cache.insert(id.as_i64(), product.clone()).await;
        Ok(product)
    }

    /// `POST /products` (admin). With an image, the body is multipart:
    /// the product JSON in a `product` part and the file in an `image`
    /// part; without one it is plain JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input, image), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: &ProductInput,
        image: Option<MultipartPart>,
    ) -> Result<Product, ApiError> {
        let body = Self::product_body(input, image)?;
        let created: Product = self
            .client
            .execute(Method::POST, "products", &[], body)
            .await?;
        self.invalidate_listings();
        Ok(created)
    }

    /// `PUT /products/{id}` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input, image))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
        image: Option<MultipartPart>,
    ) -> Result<Product, ApiError> {
        let body = Self::product_body(input, image)?;
        let updated: Product = self
            .client
            .execute(Method::PUT, &format!("products/{id}"), &[], body)
            .await?;
        self.product_cache.invalidate(&id.as_i64()).await;
        self.invalidate_listings();
        Ok(updated)
    }

    /// `DELETE /products/{id}` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        self.client.delete_empty(&format!("products/{id}")).await?;
        self.product_cache.invalidate(&id.as_i64()).await;
        self.invalidate_listings();
        Ok(())
    }

    /// `POST /products/bulk` (admin) - spreadsheet import.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure; row-level errors
    /// come back in the backend's message.
    #[instrument(skip(self, data), fields(file_name, bytes = data.len()))]
    pub async fn bulk_import(&self, file_name: &str, data: Vec<u8>) -> Result<(), ApiError> {
        let body = RequestBody::Multipart(vec![MultipartPart::file(
            "file",
            file_name,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            data,
        )]);
        self.client
            .execute_empty(Method::POST, "products/bulk", &[], body)
            .await?;
        self.invalidate_listings();
        Ok(())
    }

    /// `GET /products/template` (admin) - the import spreadsheet
    /// template, as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn template(&self) -> Result<Vec<u8>, ApiError> {
        self.client
            .execute_bytes(Method::GET, "products/template", &[])
            .await
    }

    fn product_body(
        input: &ProductInput,
        image: Option<MultipartPart>,
    ) -> Result<RequestBody, ApiError> {
        match image {
            None => Ok(RequestBody::json(input)?),
            Some(image_part) => {
                let product_json = serde_json::to_string(input)?;
                Ok(RequestBody::Multipart(vec![
                    MultipartPart::text("product", product_json),
                    image_part,
                ]))
            }
        }
    }

    fn invalidate_listings(&self) {
        self.product_cache.invalidate_all();
        self.factories_cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_repeats_factories_and_targets() {
        let filter = ProductFilter {
            factories: vec!["Dell".to_string(), "Lenovo".to_string()],
            targets: vec!["gaming".to_string()],
            price_min: Some(Decimal::from(10_000_000)),
            price_max: None,
            keyword: Some("thinkpad".to_string()),
            sort: Some(ProductSort::PriceAsc),
            page: Some(0),
            size: Some(12),
        };
        let query = filter.to_query();
        let factories: Vec<&str> = query
            .iter()
            .filter(|(k, _)| k == "factory")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(factories, vec!["Dell", "Lenovo"]);
        assert!(query.contains(&("sort".to_string(), "price_asc".to_string())));
        assert!(query.contains(&("priceMin".to_string(), "10000000".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "priceMax"));
    }

    #[test]
    fn test_empty_filter_has_no_params() {
        assert!(ProductFilter::default().to_query().is_empty());
    }
}
