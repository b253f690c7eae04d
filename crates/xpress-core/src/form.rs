// ── Form models ──
//
// Text-first input models for the product, vendor and login forms. Fields
// hold exactly what the user typed; `validate*` checks required fields,
// parses numbers, and produces the request body. Images are read from disk
// asynchronously and kept in selection order.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use tracing::{debug, warn};

use xpress_api::models::{SpecificationRecord, VendorPayload};
use xpress_api::{ExistingImages, ImageFile, ProductUpload};

use crate::error::CoreError;
use crate::model::{DisplayFlags, ImageRef, Priority, Product, Specification, Vendor};

const ADD_PRODUCT_MESSAGE: &str = "Please fill in all required fields.";
const EDIT_PRODUCT_MESSAGE: &str =
    "Please fill in all required fields (Name, Price, Stock, Category, and Vendor).";
const VENDOR_MESSAGE: &str = "Please fill in all required fields (Name, Email, Phone, Location).";
const LOGIN_MESSAGE: &str = "Please enter your email and password.";

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Collect the names of blank required fields into a `MissingFields` error.
fn require(
    message: &str,
    fields: &[(&'static str, &str)],
) -> Result<(), CoreError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| blank(value))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::MissingFields {
            message: message.to_owned(),
            fields: missing,
        })
    }
}

fn parse_price(raw: &str) -> Result<f64, CoreError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(CoreError::ValidationFailed {
            message: format!("Price must be a non-negative number, got '{}'", raw.trim()),
        }),
    }
}

fn parse_count(field: &str, raw: &str) -> Result<u32, CoreError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| CoreError::ValidationFailed {
            message: format!("{field} must be a whole number, got '{}'", raw.trim()),
        })
}

// ── Product form ─────────────────────────────────────────────────────

/// Add/edit product form state.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub item_name: String,
    pub vendor_id: String,
    pub price: String,
    /// Quantity on the add form, stock on the edit form.
    pub quantity: String,
    pub condition: String,
    pub description: String,
    pub category_id: String,
    pub brand: String,
    pub part_number: String,
    pub specifications: Vec<Specification>,
    pub compatibility: Vec<String>,
    pub flags: DisplayFlags,
    pub priority: String,
    /// Newly selected images; the first becomes the main image unless an
    /// existing one is kept.
    pub images: Vec<ImageUpload>,
    pub existing_main: Option<ImageRef>,
    pub existing_additional: Vec<ImageRef>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            item_name: String::new(),
            vendor_id: String::new(),
            price: String::new(),
            quantity: String::new(),
            condition: "new".into(),
            description: String::new(),
            category_id: String::new(),
            brand: String::new(),
            part_number: String::new(),
            specifications: Vec::new(),
            compatibility: Vec::new(),
            flags: DisplayFlags {
                display_on_page: true,
                ..DisplayFlags::default()
            },
            priority: "1".into(),
            images: Vec::new(),
            existing_main: None,
            existing_additional: Vec::new(),
        }
    }
}

impl ProductForm {
    /// Prefill the edit form from a stored product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            item_name: product.name.clone(),
            vendor_id: product.vendor_id.clone().unwrap_or_default(),
            price: product.price.to_string(),
            quantity: product.stock.to_string(),
            condition: product.condition.clone(),
            description: product.description.clone(),
            category_id: product.category_id.clone().unwrap_or_default(),
            brand: product.brand.clone().unwrap_or_default(),
            part_number: product.part_number.clone().unwrap_or_default(),
            specifications: product.specifications.clone(),
            compatibility: product.compatibility.clone(),
            flags: product.flags,
            priority: product.priority.to_string(),
            images: Vec::new(),
            existing_main: product.main_image.clone(),
            existing_additional: product.additional_images.clone(),
        }
    }

    /// Validate for `POST /products`. Requires item name, price and
    /// quantity.
    pub fn validate_new(&self) -> Result<ProductUpload, CoreError> {
        require(
            ADD_PRODUCT_MESSAGE,
            &[
                ("Item Name", self.item_name.as_str()),
                ("Price", self.price.as_str()),
                ("Quantity", self.quantity.as_str()),
            ],
        )?;
        self.upload(None)
    }

    /// Validate for `PUT /products/:id`. Requires name, price, stock,
    /// category and vendor; kept images travel with the upload.
    pub fn validate_edit(&self) -> Result<ProductUpload, CoreError> {
        require(
            EDIT_PRODUCT_MESSAGE,
            &[
                ("Name", self.item_name.as_str()),
                ("Price", self.price.as_str()),
                ("Stock", self.quantity.as_str()),
                ("Category", self.category_id.as_str()),
                ("Vendor", self.vendor_id.as_str()),
            ],
        )?;
        self.upload(Some(ExistingImages {
            main: self.existing_main.clone(),
            additional: self.existing_additional.clone(),
        }))
    }

    fn upload(&self, existing: Option<ExistingImages>) -> Result<ProductUpload, CoreError> {
        let priority = if blank(&self.priority) {
            0
        } else {
            parse_count("Priority", self.priority.as_str())?
        };

        Ok(ProductUpload {
            item_name: self.item_name.trim().to_owned(),
            vendor_id: self.vendor_id.trim().to_owned(),
            price: parse_price(&self.price)?,
            quantity: parse_count("Quantity", self.quantity.as_str())?,
            condition: self.condition.clone(),
            description: self.description.clone(),
            category_id: self.category_id.trim().to_owned(),
            brand: self.brand.trim().to_owned(),
            part_number: self.part_number.trim().to_owned(),
            specifications: self
                .specifications
                .iter()
                .map(|s| SpecificationRecord {
                    label: s.label.trim().to_owned(),
                    value: s.value.trim().to_owned(),
                })
                .collect(),
            compatibility: self
                .compatibility
                .iter()
                .map(|c| c.trim().to_owned())
                .collect(),
            featured: self.flags.featured,
            new_product: self.flags.new_product,
            hot_product: self.flags.hot_product,
            show_on_home: self.flags.show_on_home,
            display_on_page: self.flags.display_on_page,
            priority,
            images: self.images.iter().cloned().map(ImageUpload::into_file).collect(),
            existing,
        })
    }
}

// ── Vendor form ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VendorForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub company: String,
    pub website: String,
    pub notes: String,
    pub priority: Priority,
    pub is_active: bool,
    pub category: String,
}

impl Default for VendorForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            company: String::new(),
            website: String::new(),
            notes: String::new(),
            priority: Priority::Medium,
            is_active: true,
            category: String::new(),
        }
    }
}

impl VendorForm {
    pub fn from_vendor(vendor: &Vendor) -> Self {
        Self {
            name: vendor.name.clone(),
            email: vendor.email.clone(),
            phone: vendor.phone.clone(),
            location: vendor.location.clone(),
            company: vendor.company.clone().unwrap_or_default(),
            website: vendor.website.clone().unwrap_or_default(),
            notes: vendor.notes.clone().unwrap_or_default(),
            priority: vendor.priority.unwrap_or_default(),
            is_active: vendor.is_active,
            category: vendor.category.clone().unwrap_or_default(),
        }
    }

    /// Requires name, email, phone and location.
    pub fn validate(&self) -> Result<VendorPayload, CoreError> {
        require(
            VENDOR_MESSAGE,
            &[
                ("Name", self.name.as_str()),
                ("Email", self.email.as_str()),
                ("Phone", self.phone.as_str()),
                ("Location", self.location.as_str()),
            ],
        )?;
        Ok(VendorPayload {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            location: self.location.trim().to_owned(),
            company: self.company.trim().to_owned(),
            website: self.website.trim().to_owned(),
            notes: self.notes.trim().to_owned(),
            priority: self.priority.to_string(),
            is_active: self.is_active,
            category: self.category.trim().to_owned(),
        })
    }
}

// ── Login form ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Both fields are required. Returns the trimmed email and the
    /// password as typed.
    pub fn validate(&self) -> Result<(&str, &str), CoreError> {
        require(
            LOGIN_MESSAGE,
            &[("Email", self.email.as_str()), ("Password", self.password.as_str())],
        )?;
        Ok((self.email.trim(), &self.password))
    }
}

// ── Images ───────────────────────────────────────────────────────────

/// An image file read from disk, ready for preview or upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// MIME type for an image file extension, or `None` for non-images.
fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        _ => return None,
    })
}

impl ImageUpload {
    /// Read an image from `path`. Returns `Ok(None)` (with a warning) when
    /// the file is not an image.
    pub async fn from_path(path: &Path) -> Result<Option<Self>, CoreError> {
        let Some(mime) = image_mime(path) else {
            warn!(path = %path.display(), "skipping non-image file");
            return Ok(None);
        };

        let bytes = tokio::fs::read(path).await.map_err(|e| CoreError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());

        debug!(file = %file_name, mime, size = bytes.len(), "image loaded");
        Ok(Some(Self {
            file_name,
            mime,
            bytes,
        }))
    }

    /// `data:{mime};base64,...` preview string.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    pub fn into_file(self) -> ImageFile {
        ImageFile {
            file_name: self.file_name,
            mime: self.mime.to_owned(),
            bytes: self.bytes,
        }
    }
}

/// Read every path concurrently. Results keep the order of `paths`;
/// non-image files are left out. The first read error fails the batch.
pub async fn load_images(paths: &[PathBuf]) -> Result<Vec<ImageUpload>, CoreError> {
    let loaded = join_all(paths.iter().map(|p| ImageUpload::from_path(p))).await;
    let mut images = Vec::with_capacity(loaded.len());
    for image in loaded {
        images.extend(image?);
    }
    Ok(images)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn filled_product() -> ProductForm {
        ProductForm {
            item_name: " Premium Brake Pads ".into(),
            price: "89.99".into(),
            quantity: "4".into(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn add_requires_name_price_quantity() {
        let err = ProductForm::default().validate_new().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields.");
        let CoreError::MissingFields { fields, .. } = err else {
            panic!("expected MissingFields");
        };
        assert_eq!(fields, vec!["Item Name", "Price", "Quantity"]);
    }

    #[test]
    fn add_builds_upload() {
        let upload = filled_product().validate_new().unwrap();
        assert_eq!(upload.item_name, "Premium Brake Pads");
        assert!((upload.price - 89.99).abs() < f64::EPSILON);
        assert_eq!(upload.quantity, 4);
        assert_eq!(upload.condition, "new");
        assert_eq!(upload.priority, 1);
        assert!(upload.display_on_page);
        assert!(upload.existing.is_none());
    }

    #[test]
    fn edit_requires_category_and_vendor() {
        let err = filled_product().validate_edit().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields (Name, Price, Stock, Category, and Vendor)."
        );
        let CoreError::MissingFields { fields, .. } = err else {
            panic!("expected MissingFields");
        };
        assert_eq!(fields, vec!["Category", "Vendor"]);
    }

    #[test]
    fn edit_carries_existing_images() {
        let form = ProductForm {
            category_id: "body-chassis".into(),
            vendor_id: "v1".into(),
            existing_main: Some(ImageRef::Url("https://cdn/x.png".into())),
            ..filled_product()
        };
        let upload = form.validate_edit().unwrap();
        let existing = upload.existing.unwrap();
        assert_eq!(existing.main.map(|m| m.url().to_owned()), Some("https://cdn/x.png".into()));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let form = ProductForm {
            price: "cheap".into(),
            ..filled_product()
        };
        assert!(matches!(
            form.validate_new(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn vendor_defaults_and_required_fields() {
        let form = VendorForm::default();
        assert_eq!(form.priority, Priority::Medium);
        assert!(form.is_active);

        let err = form.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields (Name, Email, Phone, Location)."
        );

        let payload = VendorForm {
            name: "Acme".into(),
            email: "sales@acme.io".into(),
            phone: "+233 20 000 0000".into(),
            location: "Accra".into(),
            ..VendorForm::default()
        }
        .validate()
        .unwrap();
        assert_eq!(payload.priority, "medium");
        assert!(payload.is_active);
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            email: "admin@xpress.io".into(),
            password: String::new(),
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Please enter your email and password."
        );
    }

    #[tokio::test]
    async fn images_load_in_order_and_skip_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.PNG");
        let notes = dir.path().join("notes.txt");
        let b = dir.path().join("b.jpg");
        std::fs::write(&a, b"aaa").unwrap();
        std::fs::write(&notes, b"not an image").unwrap();
        std::fs::write(&b, b"bbb").unwrap();

        let images = load_images(&[a, notes, b]).await.unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg"]);
        assert_eq!(images[1].mime, "image/jpeg");
        assert_eq!(images[0].data_url(), "data:image/png;base64,YWFh");
    }

    #[tokio::test]
    async fn missing_image_file_is_an_io_error() {
        let err = ImageUpload::from_path(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
