/// Metadata loading and lint tests

pub mod provider;

use std::path::Path;

/// Write a form definition file into a metadata directory
pub fn write_form(dir: &Path, file_name: &str, content: &str) {
    std::fs::write(dir.join(file_name), content).expect("failed to write form file");
}

pub const LEAD_JSON: &str = r#"{
  "fields": [
    {
      "key": "name",
      "label": "Name",
      "type": "text",
      "required": true,
      "validations": [{ "type": "pattern", "value": "^[A-Za-z ]+$", "message": "Letters only" }]
    },
    {
      "key": "budget",
      "label": "Budget",
      "type": "number",
      "validations": [{ "type": "min", "value": 100 }]
    },
    {
      "key": "approver",
      "label": "Approver",
      "type": "email",
      "conditions": [
        { "field": "budget", "operator": "greaterThan", "value": 10000, "action": "require" }
      ]
    }
  ]
}"#;

pub const LEAD_TOML: &str = r#"
[[fields]]
key = "price"
label = "Price"
type = "number"

[[fields]]
key = "qty"
label = "Quantity"
type = "number"

[[fields]]
key = "total"
label = "Total"
type = "calculated"
formula = "price * qty"
"#;
