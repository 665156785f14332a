//! Deposit-related types for the waste bank
//!
//! An admin weighs the waste, generates a single-use QR code, and the user's
//! device decodes it into the JSON text parsed here.

use super::{UserId, WasteBankError};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decoded contents of a deposit QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    /// Single-use code minted by the admin dashboard
    pub code: String,
    pub user_id: UserId,
    pub waste_type: String,
    pub weight_kg: Decimal,
    /// Cash credited per kilogram
    pub price_per_kg: Decimal,
    /// Points credited per kilogram
    pub points_per_kg: Decimal,
}

impl DepositPayload {
    /// Parse and validate the JSON text read from a QR code
    pub fn parse(text: &str) -> Result<Self, WasteBankError> {
        let payload: DepositPayload = serde_json::from_str(text.trim())
            .map_err(|e| WasteBankError::invalid_payload(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), WasteBankError> {
        if self.code.trim().is_empty() {
            return Err(WasteBankError::invalid_payload("missing deposit code"));
        }
        if self.user_id.trim().is_empty() {
            return Err(WasteBankError::invalid_payload("missing user id"));
        }
        if self.weight_kg <= Decimal::ZERO {
            return Err(WasteBankError::invalid_payload(format!(
                "weight must be positive, got {}",
                self.weight_kg
            )));
        }
        if self.price_per_kg.is_sign_negative() || self.points_per_kg.is_sign_negative() {
            return Err(WasteBankError::invalid_payload("rates must not be negative"));
        }
        Ok(())
    }

    /// Cash and points earned by this deposit
    ///
    /// Cash is rounded to 2 decimal places, points are floored.
    pub fn credit(&self) -> Result<(Decimal, u64), WasteBankError> {
        let overflow = || WasteBankError::arithmetic_overflow("deposit", &self.user_id);

        let amount = self
            .weight_kg
            .checked_mul(self.price_per_kg)
            .ok_or_else(overflow)?
            .round_dp(2);

        let points = self
            .weight_kg
            .checked_mul(self.points_per_kg)
            .ok_or_else(overflow)?
            .floor()
            .to_u64()
            .ok_or_else(overflow)?;

        Ok((amount, points))
    }
}

/// A credited deposit, kept so each code is claimed once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    pub code: String,
    pub user_id: UserId,
    pub waste_type: String,
    pub weight_kg: Decimal,
    pub amount: Decimal,
    pub points: u64,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const VALID: &str = r#"{
        "code": "DEP-0001",
        "userId": "u1",
        "wasteType": "plastic",
        "weightKg": "2.5",
        "pricePerKg": "3000",
        "pointsPerKg": "10"
    }"#;

    #[test]
    fn test_parse_valid_payload() {
        let payload = DepositPayload::parse(VALID).unwrap();
        assert_eq!(payload.code, "DEP-0001");
        assert_eq!(payload.user_id, "u1");
        assert_eq!(payload.waste_type, "plastic");
        assert_eq!(payload.weight_kg, Decimal::new(25, 1));
    }

    #[test]
    fn test_credit_rounds_cash_and_floors_points() {
        let payload = DepositPayload {
            code: "DEP-1".to_string(),
            user_id: "u1".to_string(),
            waste_type: "paper".to_string(),
            weight_kg: Decimal::new(1333, 3),     // 1.333 kg
            price_per_kg: Decimal::new(1500, 0),  // 1500 per kg
            points_per_kg: Decimal::new(125, 1), // 12.5 per kg
        };

        let (amount, points) = payload.credit().unwrap();
        assert_eq!(amount, Decimal::new(199950, 2));
        assert_eq!(points, 16);
    }

    #[rstest]
    #[case::not_json("hello")]
    #[case::missing_field(r#"{"code":"DEP-1","userId":"u1"}"#)]
    #[case::empty_code(r#"{"code":" ","userId":"u1","wasteType":"glass","weightKg":"1","pricePerKg":"1","pointsPerKg":"1"}"#)]
    #[case::zero_weight(r#"{"code":"DEP-1","userId":"u1","wasteType":"glass","weightKg":"0","pricePerKg":"1","pointsPerKg":"1"}"#)]
    #[case::negative_rate(r#"{"code":"DEP-1","userId":"u1","wasteType":"glass","weightKg":"1","pricePerKg":"-1","pointsPerKg":"1"}"#)]
    fn test_parse_rejects_invalid(#[case] text: &str) {
        assert!(matches!(
            DepositPayload::parse(text),
            Err(WasteBankError::InvalidPayload { .. })
        ));
    }
}
