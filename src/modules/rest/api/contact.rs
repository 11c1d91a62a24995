// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::paginated::paginate_vec;
use crate::modules::contact::entity::{Contact, ContactCreateRequest, ContactUpdateRequest};
use crate::modules::contact::group::{ContactGroup, ContactGroupCreateRequest};
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::DataPage;
use crate::modules::rest::ApiResult;
use crate::raise_error;
use poem::web::Path;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct ContactApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Contact")]
impl ContactApi {
    /// Create a contact
    #[oai(path = "/contact", method = "post", operation_id = "create_contact")]
    async fn create_contact(
        &self,
        ///Request Body
        payload: Json<ContactCreateRequest>,
    ) -> ApiResult<Json<Contact>> {
        let contact = Contact::new(payload.0)?;
        contact.clone().save().await?;
        Ok(Json(contact))
    }

    /// Import contacts in bulk
    ///
    /// The whole batch is validated first and persisted in one transaction;
    /// a single invalid entry rejects the import.
    #[oai(
        path = "/contact-import",
        method = "post",
        operation_id = "import_contacts"
    )]
    async fn import_contacts(
        &self,
        ///Request Body
        payload: Json<Vec<ContactCreateRequest>>,
    ) -> ApiResult<Json<Vec<Contact>>> {
        Ok(Json(Contact::import(payload.0).await?))
    }

    /// Retrieve a contact
    #[oai(path = "/contact/:id", method = "get", operation_id = "get_contact")]
    async fn get_contact(&self, id: Path<u64>) -> ApiResult<Json<Contact>> {
        let contact = Contact::get(id.0).await?.ok_or_else(|| {
            raise_error!(
                format!("Contact with id '{}' not found", id.0),
                ErrorCode::ResourceNotFound
            )
        })?;
        Ok(Json(contact))
    }

    /// Update a contact
    #[oai(path = "/contact/:id", method = "post", operation_id = "update_contact")]
    async fn update_contact(
        &self,
        ///Request Body
        payload: Json<ContactUpdateRequest>,
        id: Path<u64>,
    ) -> ApiResult<Json<Contact>> {
        Ok(Json(Contact::update(id.0, payload.0).await?))
    }

    /// Delete a contact
    #[oai(
        path = "/contact/:id",
        method = "delete",
        operation_id = "remove_contact"
    )]
    async fn remove_contact(&self, id: Path<u64>) -> ApiResult<()> {
        Ok(Contact::delete(id.0).await?)
    }

    /// List contacts
    #[oai(path = "/contact-list", method = "get", operation_id = "list_contacts")]
    async fn list_contacts(
        &self,
        /// Optional. The page number to retrieve (starting from 1).
        page: Query<Option<u64>>,
        /// Optional. The number of items per page.
        page_size: Query<Option<u64>>,
        /// Optional. Whether to sort the list in descending order.
        desc: Query<Option<bool>>,
        /// Optional. Restrict the listing to one group.
        group: Query<Option<String>>,
    ) -> ApiResult<Json<DataPage<Contact>>> {
        if let Some(group) = group.0 {
            let contacts = Contact::list_by_group(&group).await?;
            let page = paginate_vec(&contacts, page.0, page_size.0)?;
            return Ok(Json(DataPage::from(page)));
        }
        Ok(Json(
            Contact::paginate_list(page.0, page_size.0, desc.0).await?,
        ))
    }

    /// Create a contact group
    #[oai(path = "/group", method = "post", operation_id = "create_group")]
    async fn create_group(
        &self,
        ///Request Body
        payload: Json<ContactGroupCreateRequest>,
    ) -> ApiResult<Json<ContactGroup>> {
        let group = ContactGroup::new(payload.0)?;
        group.clone().save().await?;
        Ok(Json(group))
    }

    /// List contact groups
    #[oai(path = "/group-list", method = "get", operation_id = "list_groups")]
    async fn list_groups(&self) -> ApiResult<Json<Vec<ContactGroup>>> {
        Ok(Json(ContactGroup::list_all().await?))
    }

    /// Delete a contact group
    #[oai(path = "/group/:id", method = "delete", operation_id = "remove_group")]
    async fn remove_group(
        &self,
        id: Path<u64>,
        /// Optional. Also remove the contacts that belong to the group.
        remove_contacts: Query<Option<bool>>,
    ) -> ApiResult<()> {
        Ok(ContactGroup::delete(id.0, remove_contacts.0.unwrap_or(false)).await?)
    }
}
