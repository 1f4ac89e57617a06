//! Request DTOs for estimate API endpoints and their mapping to domain types.

use serde::Deserialize;

use super::errors::ValidationError;
use super::models::{
    CustomerContact, ItemCounts, MovingSeason, OptionalService, OrderRequest, PrefectureId,
};

/// Request to estimate a move
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    pub old_prefecture_id: i32,
    pub new_prefecture_id: i32,
    /// Season code ("0", "1", "2") or snake_case season name
    pub moving_month: String,
    #[serde(default, rename = "box")]
    pub box_count: i64,
    #[serde(default)]
    pub bed: i64,
    #[serde(default)]
    pub bicycle: i64,
    #[serde(default)]
    pub washing_machine: i64,
    #[serde(default)]
    pub washing_machine_installation: bool,
}

/// Request to confirm an order: the estimate inputs plus customer contact
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSubmission {
    pub customer_name: String,
    pub tel: String,
    pub email: String,
    pub old_address: String,
    pub new_address: String,
    #[serde(flatten)]
    pub estimate: EstimateRequest,
}

impl EstimateRequest {
    /// Map the form fields onto a validated [`OrderRequest`].
    ///
    /// Collects every field error instead of stopping at the first one.
    pub fn to_order_request(&self) -> Result<OrderRequest, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let season = match self.moving_month.parse::<MovingSeason>() {
            Ok(season) => Some(season),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let mut count = |field: &'static str, value: i64| -> u32 {
            match u32::try_from(value) {
                Ok(v) => v,
                Err(_) if value < 0 => {
                    errors.push(ValidationError::NegativeCount { field, value });
                    0
                }
                Err(_) => {
                    errors.push(ValidationError::Overflow(field));
                    0
                }
            }
        };

        let items = ItemCounts {
            boxes: count("box", self.box_count),
            beds: count("bed", self.bed),
            bicycles: count("bicycle", self.bicycle),
            washing_machines: count("washing_machine", self.washing_machine),
        };

        match season {
            Some(season) if errors.is_empty() => {
                let mut request = OrderRequest::new(
                    PrefectureId(self.old_prefecture_id),
                    PrefectureId(self.new_prefecture_id),
                    season,
                    items,
                );
                if self.washing_machine_installation {
                    request = request.with_service(OptionalService::WashingMachineInstallation);
                }
                Ok(request)
            }
            _ => Err(errors),
        }
    }
}

impl OrderSubmission {
    pub fn contact(&self) -> Result<CustomerContact, Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("customer_name", &self.customer_name),
            ("tel", &self.tel),
            ("email", &self.email),
            ("old_address", &self.old_address),
            ("new_address", &self.new_address),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::Blank(field));
            }
        }

        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.push(ValidationError::InvalidEmail(email.to_string()));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CustomerContact {
            name: self.customer_name.trim().to_string(),
            tel: self.tel.trim().to_string(),
            email: email.to_string(),
            old_address: self.old_address.trim().to_string(),
            new_address: self.new_address.trim().to_string(),
        })
    }

    /// Validate both the contact details and the estimate inputs.
    pub fn validate(&self) -> Result<(CustomerContact, OrderRequest), Vec<ValidationError>> {
        match (self.contact(), self.estimate.to_order_request()) {
            (Ok(contact), Ok(request)) => Ok((contact, request)),
            (contact, request) => {
                let mut errors = contact.err().unwrap_or_default();
                errors.extend(request.err().unwrap_or_default());
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EstimateRequest {
        serde_json::from_value(serde_json::json!({
            "old_prefecture_id": 13,
            "new_prefecture_id": 27,
            "moving_month": "0",
            "box": 30,
            "bed": 1,
            "bicycle": 0,
            "washing_machine": 1,
            "washing_machine_installation": true
        }))
        .unwrap()
    }

    #[test]
    fn test_maps_form_to_order_request() {
        let request = form().to_order_request().unwrap();

        assert_eq!(request.origin, PrefectureId(13));
        assert_eq!(request.destination, PrefectureId(27));
        assert_eq!(request.season, MovingSeason::PeakSpring);
        assert_eq!(request.items.boxes, 30);
        assert_eq!(request.items.beds, 1);
        assert_eq!(request.items.washing_machines, 1);
        assert!(request
            .services
            .contains(&OptionalService::WashingMachineInstallation));
    }

    #[test]
    fn test_counts_default_to_zero() {
        let form: EstimateRequest = serde_json::from_value(serde_json::json!({
            "old_prefecture_id": 1,
            "new_prefecture_id": 2,
            "moving_month": "standard"
        }))
        .unwrap();

        let request = form.to_order_request().unwrap();
        assert_eq!(request.items, ItemCounts::default());
        assert!(request.services.is_empty());
    }

    #[test]
    fn test_negative_counts_are_rejected() {
        let mut f = form();
        f.bed = -1;
        f.bicycle = -3;

        let errors = f.to_order_request().unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::NegativeCount {
                    field: "bed",
                    value: -1
                },
                ValidationError::NegativeCount {
                    field: "bicycle",
                    value: -3
                },
            ]
        );
    }

    #[test]
    fn test_unknown_month_is_rejected() {
        let mut f = form();
        f.moving_month = "5".to_string();

        let errors = f.to_order_request().unwrap_err();
        assert_eq!(errors, vec![ValidationError::UnknownSeason("5".to_string())]);
    }

    #[test]
    fn test_submission_collects_all_errors() {
        let submission: OrderSubmission = serde_json::from_value(serde_json::json!({
            "customer_name": " ",
            "tel": "03-1234-5678",
            "email": "not-an-email",
            "old_address": "Tokyo",
            "new_address": "Osaka",
            "old_prefecture_id": 13,
            "new_prefecture_id": 27,
            "moving_month": "x",
            "box": -1
        }))
        .unwrap();

        let errors = submission.validate().unwrap_err();

        assert!(errors.contains(&ValidationError::Blank("customer_name")));
        assert!(errors.contains(&ValidationError::InvalidEmail("not-an-email".to_string())));
        assert!(errors.contains(&ValidationError::UnknownSeason("x".to_string())));
        assert!(errors.contains(&ValidationError::NegativeCount {
            field: "box",
            value: -1
        }));
    }

    #[test]
    fn test_submission_trims_contact() {
        let submission = OrderSubmission {
            customer_name: "  Yamada Taro ".to_string(),
            tel: "090-0000-0000".to_string(),
            email: "taro@example.com".to_string(),
            old_address: "Chiyoda".to_string(),
            new_address: "Kita".to_string(),
            estimate: form(),
        };

        let (contact, request) = submission.validate().unwrap();
        assert_eq!(contact.name, "Yamada Taro");
        assert_eq!(request.season, MovingSeason::PeakSpring);
    }
}
