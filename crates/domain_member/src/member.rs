//! Member definition and remote synchronization request
//!
//! The remote member database is keyed by email, so members have no
//! remote identifier. Synchronization sends a `synchroMember` object with
//! a flattened key/value list of every non-identifier field: keys are the
//! uppercased field names, booleans become `1`/`0`, and absent values
//! become empty strings.

use serde::{Deserialize, Serialize};

use core_kernel::identifiers::MemberId;
use core_kernel::remote::{KeyValue, ParamValue, RemoteRequest};

use crate::error::MemberError;

/// A user registered in the member database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Local identifier (never sent remotely)
    pub id: MemberId,
    /// Email address; the platform's member key
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub phone: Option<String>,
    pub zipcode: Option<String>,
    pub address: Option<String>,
    pub company_trade_name: Option<String>,
    pub company_address: Option<String>,
    pub company_zipcode: Option<String>,
    pub company_email: Option<String>,
    pub company_type: Option<String>,
    pub cif: Option<String>,
    pub company_activities: Option<String>,
    pub company_phone: Option<String>,
    /// Deactivated members stay in both databases with this flag false
    pub is_active: bool,
    pub province_id: Option<i64>,
    pub city_id: Option<i64>,
    pub company_category_id: Option<i64>,
    pub company_province_id: Option<i64>,
    pub company_city_id: Option<i64>,
}

impl Member {
    /// Creates a new inactive member with the given email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: MemberId::new_v7(),
            email: email.into(),
            firstname: None,
            lastname: None,
            phone: None,
            zipcode: None,
            address: None,
            company_trade_name: None,
            company_address: None,
            company_zipcode: None,
            company_email: None,
            company_type: None,
            cif: None,
            company_activities: None,
            company_phone: None,
            is_active: false,
            province_id: None,
            city_id: None,
            company_category_id: None,
            company_province_id: None,
            company_city_id: None,
        }
    }

    /// Sets the personal name
    pub fn with_name(
        mut self,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
    ) -> Self {
        self.firstname = Some(firstname.into());
        self.lastname = Some(lastname.into());
        self
    }

    /// Marks the member active
    pub fn activated(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Validates that the member can be keyed remotely
    ///
    /// The platform identifies members by email alone; an empty email
    /// would silently collide every unkeyed member into one record.
    pub fn validate(&self) -> Result<(), MemberError> {
        if self.email.trim().is_empty() {
            return Err(MemberError::MissingEmail);
        }
        Ok(())
    }

    /// The member key used by the remote platform
    pub fn member_uid(&self) -> String {
        format!("email:{}", self.email)
    }

    /// Builds the insert-or-update request for the member database
    pub fn sync_request(&self) -> RemoteRequest {
        let mut request = RemoteRequest::new("synchroMember");
        request.set("email", ParamValue::text(self.email.clone()));
        request.set("memberUID", ParamValue::text(self.member_uid()));
        request.set("dynContent", ParamValue::Entries(self.sync_entries()));
        request
    }

    /// Flattened key/value entries for every non-identifier field
    fn sync_entries(&self) -> Vec<KeyValue> {
        vec![
            KeyValue::new("EMAIL", self.email.clone()),
            KeyValue::new("FIRSTNAME", text(&self.firstname)),
            KeyValue::new("LASTNAME", text(&self.lastname)),
            KeyValue::new("PHONE", text(&self.phone)),
            KeyValue::new("ZIPCODE", text(&self.zipcode)),
            KeyValue::new("ADDRESS", text(&self.address)),
            KeyValue::new("COMPANY_TRADE_NAME", text(&self.company_trade_name)),
            KeyValue::new("COMPANY_ADDRESS", text(&self.company_address)),
            KeyValue::new("COMPANY_ZIPCODE", text(&self.company_zipcode)),
            KeyValue::new("COMPANY_EMAIL", text(&self.company_email)),
            KeyValue::new("COMPANY_TYPE", text(&self.company_type)),
            KeyValue::new("CIF", text(&self.cif)),
            KeyValue::new("COMPANY_ACTIVITIES", text(&self.company_activities)),
            KeyValue::new("COMPANY_PHONE", text(&self.company_phone)),
            KeyValue::new("IS_ACTIVE", flag(self.is_active)),
            KeyValue::new("PROVINCE_ID", number(&self.province_id)),
            KeyValue::new("CITY_ID", number(&self.city_id)),
            KeyValue::new("COMPANY_CATEGORY_ID", number(&self.company_category_id)),
            KeyValue::new("COMPANY_PROVINCE_ID", number(&self.company_province_id)),
            KeyValue::new("COMPANY_CITY_ID", number(&self.company_city_id)),
        ]
    }
}

// Wire normalization: booleans as 1/0, absent values as empty strings.

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number(value: &Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_uid_format() {
        let member = Member::new("a@b.com");
        assert_eq!(member.member_uid(), "email:a@b.com");
    }

    #[test]
    fn test_validate_rejects_empty_email() {
        assert!(Member::new("a@b.com").validate().is_ok());
        assert!(matches!(
            Member::new("  ").validate(),
            Err(MemberError::MissingEmail)
        ));
    }

    #[test]
    fn test_sync_request_shape() {
        let member = Member::new("a@b.com").with_name("Ada", "Lovelace").activated();
        let request = member.sync_request();

        assert_eq!(request.object(), "synchroMember");
        assert_eq!(request.get("email"), Some(&ParamValue::text("a@b.com")));
        assert_eq!(request.get("memberUID"), Some(&ParamValue::text("email:a@b.com")));
    }

    #[test]
    fn test_entries_cover_every_field_with_normalized_values() {
        let member = Member::new("a@b.com").activated();
        let entries = member.sync_entries();

        assert_eq!(entries.len(), 20);
        let find = |key: &str| {
            entries
                .iter()
                .find(|e| e.key == key)
                .unwrap_or_else(|| panic!("missing entry {key}"))
                .value
                .clone()
        };

        assert_eq!(find("EMAIL"), "a@b.com");
        assert_eq!(find("IS_ACTIVE"), "1");
        // Absent values are empty strings, not nulls
        assert_eq!(find("FIRSTNAME"), "");
        assert_eq!(find("PROVINCE_ID"), "");
    }

    #[test]
    fn test_inactive_member_flag_is_zero() {
        let member = Member::new("a@b.com");
        let entries = member.sync_entries();
        let is_active = entries.iter().find(|e| e.key == "IS_ACTIVE").unwrap();
        assert_eq!(is_active.value, "0");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn member_uid_always_email_prefixed(email in "[a-z]{1,12}@[a-z]{1,12}\\.[a-z]{2,4}") {
                let member = Member::new(email.clone());
                prop_assert_eq!(member.member_uid(), format!("email:{email}"));
            }

            #[test]
            fn entry_keys_are_uppercase_and_values_never_null(
                firstname in proptest::option::of("[A-Za-z]{1,10}"),
                province in proptest::option::of(0i64..100),
                active: bool,
            ) {
                let mut member = Member::new("a@b.com").activated();
                member.firstname = firstname;
                member.province_id = province;
                member.is_active = active;

                for entry in member.sync_entries() {
                    prop_assert_eq!(entry.key.to_uppercase(), entry.key.clone());
                }

                let json = member.sync_request().to_json();
                for entry in json["dynContent"]["entry"].as_array().unwrap() {
                    prop_assert!(entry["value"].is_string());
                }
            }
        }
    }
}
