use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub username: String,

    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub email: String,

    #[serde(default, alias = "farmName")]
    pub business_name: Option<String>,

    #[serde(default, alias = "farmPhone")]
    pub contact_info: Option<String>,

    #[serde(default, alias = "createdAt", deserialize_with = "super::null_as_empty")]
    pub created_at: String,

    #[serde(default, alias = "qrDisplaySettings")]
    pub qr_display: QrDisplaySettings,
}

/// What the owner wants shown on the public QR page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct QrDisplaySettings {
    #[serde(alias = "showFarmInfo")]
    pub show_farm_info: bool,

    #[serde(alias = "showOwnerContact")]
    pub show_owner_contact: bool,

    #[serde(alias = "showBeehiveHistory")]
    pub show_beehive_history: bool,

    #[serde(alias = "showHealthStatus")]
    pub show_health_status: bool,

    #[serde(alias = "customMessage")]
    pub custom_message: Option<String>,

    #[serde(alias = "footerText")]
    pub footer_text: Option<String>,
}

impl Default for QrDisplaySettings {
    fn default() -> Self {
        Self {
            show_farm_info: true,
            show_owner_contact: true,
            show_beehive_history: true,
            show_health_status: true,
            custom_message: None,
            footer_text: Some("Thank you for trusting our products".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_display: Option<QrDisplaySettings>,
}

impl ProfilePatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(name) = &self.business_name {
            user.business_name = Some(name.clone());
        }
        if let Some(contact) = &self.contact_info {
            user.contact_info = Some(contact.clone());
        }
        if let Some(display) = &self.qr_display {
            user.qr_display = display.clone();
        }
    }

    /// Body for the backend's profile endpoint, which uses the farm* names.
    #[must_use]
    pub fn to_backend_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        if let Some(email) = &self.email {
            body.insert("email".into(), email.clone().into());
        }
        if let Some(name) = &self.business_name {
            body.insert("farmName".into(), name.clone().into());
        }
        if let Some(contact) = &self.contact_info {
            body.insert("farmPhone".into(), contact.clone().into());
        }
        if let Some(display) = &self.qr_display {
            body.insert(
                "qrDisplaySettings".into(),
                serde_json::json!({
                    "showFarmInfo": display.show_farm_info,
                    "showOwnerContact": display.show_owner_contact,
                    "showBeehiveHistory": display.show_beehive_history,
                    "showHealthStatus": display.show_health_status,
                    "customMessage": display.custom_message,
                    "footerText": display.footer_text,
                }),
            );
        }
        serde_json::Value::Object(body)
    }
}

/// Onboarding form submitted once after first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupForm {
    pub business_name: String,

    pub contact_info: String,
}

impl From<SetupForm> for ProfilePatch {
    fn from(form: SetupForm) -> Self {
        Self {
            business_name: Some(form.business_name),
            contact_info: Some(form.contact_info),
            ..Self::default()
        }
    }
}
