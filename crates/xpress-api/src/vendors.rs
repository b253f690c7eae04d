// Vendor directory endpoints

use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::models::{VendorPayload, VendorRecord};
use crate::products::encode;

impl Client {
    /// `GET /vendors`
    pub async fn list_vendors(&self) -> Result<Vec<VendorRecord>, Error> {
        self.get("vendors", &[]).await
    }

    /// `POST /vendors`
    pub async fn create_vendor(
        &self,
        payload: &VendorPayload,
    ) -> Result<Option<VendorRecord>, Error> {
        self.post("vendors", payload).await
    }

    /// `PUT /vendors/:id`
    pub async fn update_vendor(
        &self,
        id: &str,
        payload: &VendorPayload,
    ) -> Result<Option<VendorRecord>, Error> {
        self.put(&format!("vendors/{}", encode(id)), payload).await
    }

    /// `DELETE /vendors/:id`
    pub async fn delete_vendor(&self, id: &str) -> Result<Value, Error> {
        self.delete(&format!("vendors/{}", encode(id)), &[]).await
    }
}
