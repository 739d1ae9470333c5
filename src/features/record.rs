use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SOCIAL_MEDIA_RISK_SCORE: f64 = 0.3;
pub const DEFAULT_DEVICE_USAGE_SCORE: f64 = 0.7;
pub const DEFAULT_NUMBER_OF_PRODUCTS: f64 = 2.0;
pub const DEFAULT_HAS_INVESTMENT_ACCOUNT: bool = false;
pub const DEFAULT_LATE_PAYMENTS: f64 = 0.0;
pub const DEFAULT_OVERDRAFT_EVENTS: f64 = 1.0;

/// Months of account tenure assumed per year of employment when
/// `AccountTenure` is absent.
pub const TENURE_MONTHS_PER_EMPLOYMENT_YEAR: f64 = 12.0;

/// One loan applicant as submitted for scoring.
///
/// Field names use PascalCase on the wire (`Income`, `DebtToIncome`, ...).
/// Unknown keys are rejected so a misspelled feature never turns into a
/// silent zero contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FeatureRecord {
    pub income: f64,
    pub age: f64,
    pub loan_amount: f64,
    pub credit_score: f64,
    pub debt_to_income: f64,
    pub employment_years: f64,
    pub loan_term: f64,

    /// Alternative-data social signal, 1-5 scale (see DESIGN.md)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media_risk_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_usage_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_products: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_investment_account: Option<bool>,

    /// Months the customer has held an account with the bank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_tenure: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_payments: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overdraft_events: Option<f64>,
}

/// Every feature the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Income,
    Age,
    LoanAmount,
    CreditScore,
    DebtToIncome,
    EmploymentYears,
    LoanTerm,
    SocialMediaRiskScore,
    DeviceUsageScore,
    NumberOfProducts,
    HasInvestmentAccount,
    AccountTenure,
    LatePayments,
    OverdraftEvents,
}

impl Feature {
    pub const ALL: [Feature; 14] = [
        Feature::Income,
        Feature::Age,
        Feature::LoanAmount,
        Feature::CreditScore,
        Feature::DebtToIncome,
        Feature::EmploymentYears,
        Feature::LoanTerm,
        Feature::SocialMediaRiskScore,
        Feature::DeviceUsageScore,
        Feature::NumberOfProducts,
        Feature::HasInvestmentAccount,
        Feature::AccountTenure,
        Feature::LatePayments,
        Feature::OverdraftEvents,
    ];

    /// Wire name, also the key used in coefficient tables
    pub fn name(self) -> &'static str {
        match self {
            Feature::Income => "Income",
            Feature::Age => "Age",
            Feature::LoanAmount => "LoanAmount",
            Feature::CreditScore => "CreditScore",
            Feature::DebtToIncome => "DebtToIncome",
            Feature::EmploymentYears => "EmploymentYears",
            Feature::LoanTerm => "LoanTerm",
            Feature::SocialMediaRiskScore => "SocialMediaRiskScore",
            Feature::DeviceUsageScore => "DeviceUsageScore",
            Feature::NumberOfProducts => "NumberOfProducts",
            Feature::HasInvestmentAccount => "HasInvestmentAccount",
            Feature::AccountTenure => "AccountTenure",
            Feature::LatePayments => "LatePayments",
            Feature::OverdraftEvents => "OverdraftEvents",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            Feature::Income
                | Feature::Age
                | Feature::LoanAmount
                | Feature::CreditScore
                | Feature::DebtToIncome
                | Feature::EmploymentYears
                | Feature::LoanTerm
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| format!("unknown feature '{}'", s))
    }
}

impl FeatureRecord {
    /// Build a record holding only the required fields.
    pub fn new(
        income: f64,
        age: f64,
        loan_amount: f64,
        credit_score: f64,
        debt_to_income: f64,
        employment_years: f64,
        loan_term: f64,
    ) -> Self {
        Self {
            income,
            age,
            loan_amount,
            credit_score,
            debt_to_income,
            employment_years,
            loan_term,
            social_media_risk_score: None,
            device_usage_score: None,
            number_of_products: None,
            has_investment_account: None,
            account_tenure: None,
            late_payments: None,
            overdraft_events: None,
        }
    }

    /// Raw value as submitted. Optional features that were omitted return
    /// `None`; booleans map to 1.0 / 0.0.
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Income => Some(self.income),
            Feature::Age => Some(self.age),
            Feature::LoanAmount => Some(self.loan_amount),
            Feature::CreditScore => Some(self.credit_score),
            Feature::DebtToIncome => Some(self.debt_to_income),
            Feature::EmploymentYears => Some(self.employment_years),
            Feature::LoanTerm => Some(self.loan_term),
            Feature::SocialMediaRiskScore => self.social_media_risk_score,
            Feature::DeviceUsageScore => self.device_usage_score,
            Feature::NumberOfProducts => self.number_of_products,
            Feature::HasInvestmentAccount => self
                .has_investment_account
                .map(|flag| if flag { 1.0 } else { 0.0 }),
            Feature::AccountTenure => self.account_tenure,
            Feature::LatePayments => self.late_payments,
            Feature::OverdraftEvents => self.overdraft_events,
        }
    }

    /// Value with the documented default substituted for omitted features.
    pub fn resolved(&self, feature: Feature) -> f64 {
        match feature {
            Feature::SocialMediaRiskScore => self.social_media_risk_score(),
            Feature::DeviceUsageScore => self.device_usage_score(),
            Feature::NumberOfProducts => self.number_of_products(),
            Feature::HasInvestmentAccount => {
                if self.has_investment_account() {
                    1.0
                } else {
                    0.0
                }
            }
            Feature::AccountTenure => self.account_tenure(),
            Feature::LatePayments => self.late_payments(),
            Feature::OverdraftEvents => self.overdraft_events(),
            required => self.get(required).unwrap_or_default(),
        }
    }

    /// Features present in the record, in declaration order.
    pub fn present_values(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL
            .iter()
            .filter_map(move |&feature| self.get(feature).map(|value| (feature, value)))
    }

    pub fn social_media_risk_score(&self) -> f64 {
        self.social_media_risk_score
            .unwrap_or(DEFAULT_SOCIAL_MEDIA_RISK_SCORE)
    }

    pub fn device_usage_score(&self) -> f64 {
        self.device_usage_score.unwrap_or(DEFAULT_DEVICE_USAGE_SCORE)
    }

    pub fn number_of_products(&self) -> f64 {
        self.number_of_products.unwrap_or(DEFAULT_NUMBER_OF_PRODUCTS)
    }

    pub fn has_investment_account(&self) -> bool {
        self.has_investment_account
            .unwrap_or(DEFAULT_HAS_INVESTMENT_ACCOUNT)
    }

    pub fn account_tenure(&self) -> f64 {
        self.account_tenure
            .unwrap_or(self.employment_years * TENURE_MONTHS_PER_EMPLOYMENT_YEAR)
    }

    pub fn late_payments(&self) -> f64 {
        self.late_payments.unwrap_or(DEFAULT_LATE_PAYMENTS)
    }

    pub fn overdraft_events(&self) -> f64 {
        self.overdraft_events.unwrap_or(DEFAULT_OVERDRAFT_EVENTS)
    }
}
