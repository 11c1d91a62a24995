// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::contact::entity::Contact;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{delete_impl, insert_impl, list_all_impl, secondary_find_impl};
use crate::modules::error::code::ErrorCode;
use crate::{modules::error::RustBlastResult, raise_error, utc_now};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 2, version = 1)]
#[native_db(primary_key(pk -> String))]
pub struct ContactGroup {
    /// The unique identifier of the group
    #[secondary_key(unique)]
    pub id: u64,
    /// Group name, referenced by contacts and by campaign audience selection.
    #[secondary_key(unique)]
    pub name: String,
    pub description: Option<String>,
    /// Timestamp (in milliseconds) when the group was created.
    pub created_at: i64,
    /// Timestamp (in milliseconds) when the group was last updated.
    pub updated_at: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct ContactGroupCreateRequest {
    pub name: String,
    pub description: Option<String>,
}

impl ContactGroup {
    fn pk(&self) -> String {
        format!("{}_{}", self.created_at, self.id)
    }

    pub fn new(request: ContactGroupCreateRequest) -> RustBlastResult<Self> {
        if request.name.trim().is_empty() {
            return Err(raise_error!(
                "Group name must not be empty".into(),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(Self {
            id: id!(64),
            name: request.name,
            description: request.description,
            created_at: utc_now!(),
            updated_at: utc_now!(),
        })
    }

    pub async fn save(self) -> RustBlastResult<()> {
        if Self::get_by_name(&self.name).await?.is_some() {
            return Err(raise_error!(
                format!("A group named '{}' already exists", self.name),
                ErrorCode::AlreadyExists
            ));
        }
        insert_impl(DB_MANAGER.meta_db(), self).await
    }

    pub async fn get(id: u64) -> RustBlastResult<Option<ContactGroup>> {
        secondary_find_impl(DB_MANAGER.meta_db(), ContactGroupKey::id, id).await
    }

    pub async fn get_by_name(name: &str) -> RustBlastResult<Option<ContactGroup>> {
        secondary_find_impl(DB_MANAGER.meta_db(), ContactGroupKey::name, name.to_string()).await
    }

    pub async fn list_all() -> RustBlastResult<Vec<ContactGroup>> {
        list_all_impl(DB_MANAGER.meta_db()).await
    }

    /// Delete the group. When `remove_contacts` is set, the group's contacts
    /// are removed as well; otherwise they are left behind, ungrouped.
    pub async fn delete(id: u64, remove_contacts: bool) -> RustBlastResult<()> {
        let group = Self::get(id).await?.ok_or_else(|| {
            raise_error!(
                format!("Group with id '{}' not found", id),
                ErrorCode::ResourceNotFound
            )
        })?;
        if remove_contacts {
            Contact::delete_by_group(group.name.clone()).await?;
        }
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .secondary::<ContactGroup>(ContactGroupKey::id, id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!("Group with id '{}' not found", id),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }
}
