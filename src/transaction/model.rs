use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::blockchain::now_timestamp;

/// Reserved recipient for data-sample transactions: the classifier itself.
pub const MODEL_RECIPIENT: &str = "MODEL";

/// Kind tag as it appears in the stored (wire) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "flower_data")]
    DataSample,
}

/// The closed label set accepted by data-sample transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Species {
    Setosa,
    Versicolor,
    Virginica,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Setosa, Species::Versicolor, Species::Virginica];

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Setosa => "setosa",
            Species::Versicolor => "versicolor",
            Species::Virginica => "virginica",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSpecies;

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|sp| sp.as_str() == s)
            .ok_or(UnknownSpecies)
    }
}

/// Four iris measurements plus the submitted label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub flower_type: String,
}

impl SampleData {
    pub fn features(&self) -> [f64; 4] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }
}

/// Kind-specific payload of a live transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxKind {
    Transfer,
    DataSample(SampleData),
}

/// A typed, self-validating unit of intent. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    sender: String,
    recipient: String,
    amount: f64,
    timestamp: f64,
    kind: TxKind,
}

/// Flattened record stored inside blocks and hashed.
/// Field order here is the canonical serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: TxType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SampleData>,
}

impl WireTransaction {
    /// The sample carried by a data-sample record, if any.
    pub fn data_sample(&self) -> Option<&SampleData> {
        match self.kind {
            TxType::DataSample => self.data.as_ref(),
            TxType::Transfer => None,
        }
    }
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
        kind: TxKind,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            timestamp: now_timestamp(),
            kind,
        }
    }

    pub fn transfer(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self::new(sender, recipient, amount, TxKind::Transfer)
    }

    /// Data-sample factory: addressed to the model, moves no value.
    pub fn data_sample(
        sender: impl Into<String>,
        features: [f64; 4],
        label: impl Into<String>,
    ) -> Self {
        let [sepal_length, sepal_width, petal_length, petal_width] = features;
        Self::new(
            sender,
            MODEL_RECIPIENT,
            0.0,
            TxKind::DataSample(SampleData {
                sepal_length,
                sepal_width,
                petal_length,
                petal_width,
                flower_type: label.into(),
            }),
        )
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn kind(&self) -> &TxKind {
        &self.kind
    }

    pub fn tx_type(&self) -> TxType {
        match self.kind {
            TxKind::Transfer => TxType::Transfer,
            TxKind::DataSample(_) => TxType::DataSample,
        }
    }

    pub fn validate(&self) -> bool {
        self.rejection().is_none()
    }

    /// The first rule this transaction breaks, or `None` if it is valid.
    /// Depends only on the transaction's own fields.
    pub fn rejection(&self) -> Option<&'static str> {
        match &self.kind {
            TxKind::Transfer => {
                if !(self.amount.is_finite() && self.amount > 0.0) {
                    Some("amount must be > 0")
                } else if self.sender.is_empty() || self.recipient.is_empty() {
                    Some("sender and recipient required")
                } else {
                    None
                }
            }
            TxKind::DataSample(sample) => {
                if self.sender.is_empty() {
                    Some("sender required")
                } else if !sample.features().iter().all(|f| f.is_finite()) {
                    Some("measurements must be numeric")
                } else if sample.flower_type.parse::<Species>().is_err() {
                    Some("unknown flower_type")
                } else {
                    None
                }
            }
        }
    }

    pub fn to_wire(&self) -> WireTransaction {
        WireTransaction {
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            amount: self.amount,
            timestamp: self.timestamp,
            kind: self.tx_type(),
            data: match &self.kind {
                TxKind::Transfer => None,
                TxKind::DataSample(sample) => Some(sample.clone()),
            },
        }
    }
}
