//! Transactions (`transaccion`): a publication handed from donor/seller to
//! beneficiary/buyer

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::status;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i32,
    #[serde(rename = "publicacionId")]
    pub publication_id: i32,
    #[serde(rename = "donanteVendedorId")]
    pub donor_id: i32,
    #[serde(rename = "beneficiarioCompradorId")]
    pub beneficiary_id: i32,
    #[serde(rename = "estado")]
    pub status: i32,
    #[serde(rename = "fechaTransaccion")]
    pub transacted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub publication_id: i32,
    pub donor_id: i32,
    pub beneficiary_id: i32,
    pub status: i32,
    pub transacted_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn new(publication_id: i32, donor_id: i32, beneficiary_id: i32) -> Self {
        Self {
            publication_id,
            donor_id,
            beneficiary_id,
            status: status::ACTIVE,
            transacted_at: Utc::now(),
        }
    }

    pub fn with_date(mut self, transacted_at: DateTime<Utc>) -> Self {
        self.transacted_at = transacted_at;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub publication_id: Option<i32>,
    pub donor_id: Option<i32>,
    pub beneficiary_id: Option<i32>,
    pub status: Option<i32>,
    pub transacted_at: Option<DateTime<Utc>>,
}

impl TransactionChanges {
    pub fn deactivate() -> Self {
        Self {
            status: Some(status::INACTIVE),
            ..Self::default()
        }
    }

    pub fn apply_to(self, transaction: &mut Transaction) {
        if let Some(publication_id) = self.publication_id {
            transaction.publication_id = publication_id;
        }
        if let Some(donor_id) = self.donor_id {
            transaction.donor_id = donor_id;
        }
        if let Some(beneficiary_id) = self.beneficiary_id {
            transaction.beneficiary_id = beneficiary_id;
        }
        if let Some(status) = self.status {
            transaction.status = status;
        }
        if let Some(transacted_at) = self.transacted_at {
            transaction.transacted_at = transacted_at;
        }
    }
}
