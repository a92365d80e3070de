use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    /// Request body for `POST /signup`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub username: String,
        pub password: String,
        /// Currency code used to display every wallet balance in the profile.
        pub base_currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Profile {
        pub id: Uuid,
        pub username: String,
        pub base_currency: String,
        pub created_at: DateTime<Utc>,
        pub wallets: Vec<ProfileWallet>,
    }

    /// A wallet as listed in the profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileWallet {
        pub id: Uuid,
        pub name: String,
        pub currency: String,
        pub role: super::membership::WalletRole,
        /// Formatted with the wallet currency's decimal places.
        pub balance: String,
        /// Balance in the profile's `base_currency`. `None` until an exchange
        /// rate for the pair is available.
        pub converted_balance: Option<String>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletNew {
        pub name: String,
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        pub currency: String,
        pub role: super::membership::WalletRole,
        /// Current balance, formatted with the currency's decimal places.
        pub balance: String,
        pub balance_minor: i64,
        pub last_snapshot: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod membership {
    use super::*;

    /// Role of a user on a wallet.
    ///
    /// - `admin`: records transactions and manages members.
    /// - `user`: read-only access to balance, history and members.
    /// - `spectator`: same as `user`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WalletRole {
        Admin,
        User,
        Spectator,
    }

    /// Request body for adding a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub username: String,
        pub role: WalletRole,
    }

    /// Response body for listing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// A member with their role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub username: String,
        pub role: WalletRole,
    }
}

pub mod transaction {
    use super::*;

    /// An amount in the wallet currency. Must be > 0.
    ///
    /// A number is rounded half away from zero to the currency's decimal
    /// places. A string such as `"12.50"` is parsed exactly and rejected if it
    /// has more fractional digits than the currency allows.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Amount {
        Number(f64),
        Text(String),
    }

    /// Request body for `POST /wallets/{id}/income` and `/expense`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: Amount,
        pub category: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        /// Signed amount, formatted with the wallet currency's decimal places.
        pub amount: String,
        pub amount_minor: i64,
        pub is_deposit: bool,
        pub category: String,
        pub creator_id: Uuid,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        /// Newest first.
        pub transactions: Vec<TransactionView>,
    }
}

pub mod rates {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateView {
        pub from: String,
        pub to: String,
        /// Price of one unit of `from` in `to`.
        pub rate: f64,
    }
}
