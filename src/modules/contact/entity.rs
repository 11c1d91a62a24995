// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{
    batch_delete_impl, batch_insert_impl, delete_impl, filter_by_secondary_key_impl,
    insert_impl, list_all_impl, paginate_query_primary_scan_all_impl, secondary_find_impl,
    update_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::response::DataPage;
use crate::modules::utils::validate_phone_number;
use crate::{modules::error::RustBlastResult, raise_error, utc_now};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 1, version = 1)]
#[native_db(primary_key(pk -> String))]
pub struct Contact {
    /// The unique identifier of the contact
    #[secondary_key(unique)]
    pub id: u64,
    /// Display name, also used for template rendering and attachment matching.
    pub name: String,
    /// Destination phone number in international format.
    pub number: String,
    /// Name of the group this contact belongs to. Empty when ungrouped.
    #[secondary_key]
    pub group: String,
    /// Free-form fields available to message templates as placeholders.
    pub custom_fields: BTreeMap<String, String>,
    /// Timestamp (in milliseconds) when the contact was created.
    pub created_at: i64,
    /// Timestamp (in milliseconds) when the contact was last updated.
    pub updated_at: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct ContactCreateRequest {
    pub name: String,
    pub number: String,
    pub group: Option<String>,
    pub custom_fields: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct ContactUpdateRequest {
    pub name: Option<String>,
    pub number: Option<String>,
    pub group: Option<String>,
    pub custom_fields: Option<BTreeMap<String, String>>,
}

impl Contact {
    fn pk(&self) -> String {
        format!("{}_{}", self.created_at, self.id)
    }

    pub fn new(request: ContactCreateRequest) -> RustBlastResult<Self> {
        if request.name.trim().is_empty() {
            return Err(raise_error!(
                "Contact name must not be empty".into(),
                ErrorCode::InvalidParameter
            ));
        }
        validate_phone_number(&request.number)?;
        Ok(Self {
            id: id!(64),
            name: request.name,
            number: request.number,
            group: request.group.unwrap_or_default(),
            custom_fields: request.custom_fields.unwrap_or_default(),
            created_at: utc_now!(),
            updated_at: utc_now!(),
        })
    }

    pub async fn save(self) -> RustBlastResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self).await
    }

    /// Validate and persist a whole import batch in one transaction.
    pub async fn import(requests: Vec<ContactCreateRequest>) -> RustBlastResult<Vec<Contact>> {
        let contacts = requests
            .into_iter()
            .map(Contact::new)
            .collect::<RustBlastResult<Vec<_>>>()?;
        batch_insert_impl(DB_MANAGER.meta_db(), contacts.clone()).await?;
        Ok(contacts)
    }

    pub async fn get(id: u64) -> RustBlastResult<Option<Contact>> {
        secondary_find_impl(DB_MANAGER.meta_db(), ContactKey::id, id).await
    }

    pub async fn list_all() -> RustBlastResult<Vec<Contact>> {
        list_all_impl(DB_MANAGER.meta_db()).await
    }

    pub async fn list_by_group(group: &str) -> RustBlastResult<Vec<Contact>> {
        // start_with is a prefix scan; keep only exact group matches.
        let contacts: Vec<Contact> =
            filter_by_secondary_key_impl(DB_MANAGER.meta_db(), ContactKey::group, group.to_string())
                .await?;
        Ok(contacts.into_iter().filter(|c| c.group == group).collect())
    }

    pub async fn paginate_list(
        page: Option<u64>,
        page_size: Option<u64>,
        desc: Option<bool>,
    ) -> RustBlastResult<DataPage<Contact>> {
        paginate_query_primary_scan_all_impl(DB_MANAGER.meta_db(), page, page_size, desc)
            .await
            .map(DataPage::from)
    }

    pub async fn update(id: u64, request: ContactUpdateRequest) -> RustBlastResult<Contact> {
        if let Some(number) = &request.number {
            validate_phone_number(number)?;
        }
        update_impl(
            DB_MANAGER.meta_db(),
            move |rw| {
                rw.get()
                    .secondary::<Contact>(ContactKey::id, id)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("Contact with id '{}' not found", id),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            move |current| {
                let mut updated = current.clone();
                if let Some(name) = request.name {
                    updated.name = name;
                }
                if let Some(number) = request.number {
                    updated.number = number;
                }
                if let Some(group) = request.group {
                    updated.group = group;
                }
                if let Some(custom_fields) = request.custom_fields {
                    updated.custom_fields = custom_fields;
                }
                updated.updated_at = utc_now!();
                Ok(updated)
            },
        )
        .await
    }

    pub async fn delete(id: u64) -> RustBlastResult<()> {
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .secondary::<Contact>(ContactKey::id, id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!("Contact with id '{}' not found", id),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }

    /// Remove every contact in the given group. Returns the number removed.
    pub async fn delete_by_group(group: String) -> RustBlastResult<usize> {
        batch_delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.scan()
                .secondary::<Contact>(ContactKey::group)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .start_with(group.clone())
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .collect::<Result<Vec<Contact>, _>>()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
                .map(|contacts| contacts.into_iter().filter(|c| c.group == group).collect())
        })
        .await
    }
}
