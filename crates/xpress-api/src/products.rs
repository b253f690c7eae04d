// Product endpoints
//
// `GET/POST /products`, `GET/PUT/DELETE /products/:id` and
// `GET /products/category/:category`. Create and update are multipart
// because they carry image files.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{ImageRef, ProductRecord, SpecificationRecord};

/// An image file ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    fn into_part(self) -> Result<Part, Error> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)?)
    }
}

/// Multipart product body for `POST /products` and `PUT /products/:id`.
///
/// The first entry of `images` is uploaded as `mainImage` unless an existing
/// main image is kept, in which case every new image goes to
/// `additionalImages`.
#[derive(Debug, Clone, Default)]
pub struct ProductUpload {
    pub item_name: String,
    pub vendor_id: String,
    pub price: f64,
    pub quantity: u32,
    pub condition: String,
    pub description: String,
    pub category_id: String,
    pub brand: String,
    pub part_number: String,
    pub specifications: Vec<SpecificationRecord>,
    pub compatibility: Vec<String>,
    pub featured: bool,
    pub new_product: bool,
    pub hot_product: bool,
    pub show_on_home: bool,
    pub display_on_page: bool,
    pub priority: u32,
    pub images: Vec<ImageFile>,
    /// Images already stored on the backend that survive an edit.
    /// `None` on create.
    pub existing: Option<ExistingImages>,
}

/// Previously uploaded images retained by an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingImages {
    pub main: Option<ImageRef>,
    pub additional: Vec<ImageRef>,
}

impl ProductUpload {
    /// Build the multipart form.
    pub fn into_form(self) -> Result<Form, Error> {
        let specifications: Vec<&SpecificationRecord> = self
            .specifications
            .iter()
            .filter(|s| !s.label.is_empty() && !s.value.is_empty())
            .collect();
        let compatibility: Vec<&String> =
            self.compatibility.iter().filter(|c| !c.is_empty()).collect();

        let mut form = Form::new()
            .text("itemName", self.item_name)
            .text("vendorId", self.vendor_id)
            .text("price", self.price.to_string())
            .text("quantity", self.quantity.to_string())
            .text("condition", self.condition)
            .text("description", self.description)
            .text("category", self.category_id.clone())
            .text("categoryId", self.category_id)
            .text("brand", self.brand)
            .text("partNumber", self.part_number)
            .text("specifications", to_json(&specifications)?)
            .text("compatibility", to_json(&compatibility)?)
            .text("featured", self.featured.to_string())
            .text("newProduct", self.new_product.to_string())
            .text("hotProduct", self.hot_product.to_string())
            .text("showOnHome", self.show_on_home.to_string())
            .text("displayOnPage", self.display_on_page.to_string())
            .text("priority", self.priority.to_string());

        let keeps_main = self
            .existing
            .as_ref()
            .is_some_and(|existing| existing.main.is_some());

        for (index, image) in self.images.into_iter().enumerate() {
            let field = if index == 0 && !keeps_main {
                "mainImage"
            } else {
                "additionalImages"
            };
            form = form.part(field, image.into_part()?);
        }

        if let Some(existing) = self.existing {
            let main = match existing.main {
                Some(image) => to_json(&image)?,
                None => "null".into(),
            };
            form = form
                .text("existingMainImage", main)
                .text("existingAdditionalImages", to_json(&existing.additional)?);
        }

        Ok(form)
    }
}

fn to_json(value: &impl serde::Serialize) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| Error::Deserialization {
        message: format!("failed to encode form field: {e}"),
        body: String::new(),
    })
}

impl Client {
    /// `GET /products`
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>, Error> {
        self.get("products", &[]).await
    }

    /// `GET /products/:id`
    pub async fn get_product(&self, id: &str) -> Result<Option<ProductRecord>, Error> {
        self.get(&format!("products/{}", encode(id)), &[]).await
    }

    /// `GET /products/category/:category`
    pub async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductRecord>, Error> {
        self.get(&format!("products/category/{}", encode(category)), &[])
            .await
    }

    /// `POST /products` (multipart). Returns the created record when the
    /// backend echoes it.
    pub async fn create_product(
        &self,
        upload: ProductUpload,
    ) -> Result<Option<ProductRecord>, Error> {
        debug!(item = %upload.item_name, images = upload.images.len(), "creating product");
        self.send_multipart(Method::POST, "products", upload.into_form()?)
            .await
    }

    /// `PUT /products/:id` (multipart).
    pub async fn update_product(
        &self,
        id: &str,
        upload: ProductUpload,
    ) -> Result<Option<ProductRecord>, Error> {
        debug!(id, images = upload.images.len(), "updating product");
        self.send_multipart(
            Method::PUT,
            &format!("products/{}", encode(id)),
            upload.into_form()?,
        )
        .await
    }

    /// `DELETE /products/:id?hardDelete=bool`. Returns the envelope's `data`.
    pub async fn delete_product(&self, id: &str, hard_delete: bool) -> Result<Value, Error> {
        self.delete(
            &format!("products/{}", encode(id)),
            &[("hardDelete", hard_delete.to_string())],
        )
        .await
    }
}

/// Percent-encode a single path segment.
pub(crate) fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
