// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::contact::entity::Contact;
use crate::modules::filestore::entity::ManagedFile;

pub const NO_MATCHING_FILE: &str = "No matching file found in File Manager";

#[derive(Clone, Debug)]
pub struct FileMatch {
    pub contact_id: u64,
    pub file: ManagedFile,
}

/// Split of an audience into contacts with an assigned file and contacts
/// without one.
#[derive(Debug, Default)]
pub struct MatchPartition {
    pub matched: Vec<FileMatch>,
    pub unmatched: Vec<Contact>,
}

/// Assign each contact the first file whose name contains the contact name,
/// case-insensitively. Files may be assigned to more than one contact.
pub fn match_attachments(contacts: &[Contact], files: &[ManagedFile]) -> MatchPartition {
    let mut partition = MatchPartition::default();
    for contact in contacts {
        let needle = contact.name.to_lowercase();
        let hit = files
            .iter()
            .find(|file| file.name.to_lowercase().contains(&needle));
        match hit {
            Some(file) => partition.matched.push(FileMatch {
                contact_id: contact.id,
                file: file.clone(),
            }),
            None => partition.unmatched.push(contact.clone()),
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: u64, name: &str) -> Contact {
        Contact {
            id,
            name: name.to_string(),
            number: format!("62812{:08}", id),
            ..Default::default()
        }
    }

    fn file(id: u64, name: &str) -> ManagedFile {
        ManagedFile {
            id,
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            size: 1,
            created_at: 0,
        }
    }

    #[test]
    fn picks_first_file_containing_contact_name() {
        let contacts = vec![contact(1, "ana"), contact(2, "budi")];
        let files = vec![file(10, "ana_invoice.pdf"), file(11, "banana.pdf")];
        let partition = match_attachments(&contacts, &files);
        assert_eq!(partition.matched.len(), 1);
        assert_eq!(partition.matched[0].contact_id, 1);
        assert_eq!(partition.matched[0].file.id, 10);
        assert_eq!(partition.unmatched.len(), 1);
        assert_eq!(partition.unmatched[0].id, 2);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let contacts = vec![contact(1, "Ana")];
        let files = vec![file(10, "ANA_receipt.pdf")];
        let partition = match_attachments(&contacts, &files);
        assert_eq!(partition.matched.len(), 1);
        assert!(partition.unmatched.is_empty());
    }

    #[test]
    fn a_file_can_serve_several_contacts() {
        let contacts = vec![contact(1, "ana"), contact(2, "an")];
        let files = vec![file(10, "ana.pdf")];
        let partition = match_attachments(&contacts, &files);
        assert_eq!(partition.matched.len(), 2);
        assert!(partition
            .matched
            .iter()
            .all(|matched| matched.file.id == 10));
    }
}
