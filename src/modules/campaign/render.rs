// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::entity::ContactSnapshot;

/// Fill `{{placeholder}}` markers from a contact snapshot.
///
/// Reserved placeholders (`name`, `number`, `group`) are substituted before
/// custom fields, so a custom field cannot shadow them. Markers without a
/// matching field are left verbatim.
pub fn render_template(template: &str, contact: &ContactSnapshot) -> String {
    let mut rendered = template.to_string();
    rendered = rendered.replace("{{name}}", &contact.name);
    rendered = rendered.replace("{{number}}", &contact.number);
    rendered = rendered.replace("{{group}}", &contact.group);
    for (key, value) in &contact.custom_fields {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot() -> ContactSnapshot {
        let mut custom_fields = BTreeMap::new();
        custom_fields.insert("city".to_string(), "Bandung".to_string());
        custom_fields.insert("invoice".to_string(), "INV-0042".to_string());
        ContactSnapshot {
            id: 7,
            name: "Ana".to_string(),
            number: "6281234567890".to_string(),
            group: "customers".to_string(),
            custom_fields,
        }
    }

    #[test]
    fn substitutes_reserved_and_custom_fields() {
        let text = render_template(
            "Hi {{name}} ({{group}}), invoice {{invoice}} is ready in {{city}}.",
            &snapshot(),
        );
        assert_eq!(text, "Hi Ana (customers), invoice INV-0042 is ready in Bandung.");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let text = render_template("Hello {{name}}, code: {{promo}}", &snapshot());
        assert_eq!(text, "Hello Ana, code: {{promo}}");
    }

    #[test]
    fn custom_field_cannot_shadow_reserved_name() {
        let mut contact = snapshot();
        contact
            .custom_fields
            .insert("name".to_string(), "SHADOW".to_string());
        let text = render_template("{{name}}", &contact);
        assert_eq!(text, "Ana");
    }

    #[test]
    fn rendering_does_not_mutate_the_template() {
        let template = "Hi {{name}}".to_string();
        let first = render_template(&template, &snapshot());
        let second = render_template(&template, &snapshot());
        assert_eq!(first, second);
        assert_eq!(template, "Hi {{name}}");
    }
}
