//! HTTP client for the game authority.

use async_trait::async_trait;
use in_between::{
    game::{Card, Chips},
    net::{
        authority::{
            Authority, BetTicket, BoardPage, BoardQuery, EnterResponse, HandsResponse,
            RedeemTicket, RelayReceipt, StakeTicket,
        },
        errors::{ClientError, ClientResult},
    },
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// API client for communicating with the game authority
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatKeyRequest<'a> {
    seat_key: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StakeRequest<'a> {
    chips: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seat_key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BetRequest<'a> {
    seat_key: &'a str,
    bet: String,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    tx: &'a str,
}

#[derive(Debug, Serialize)]
struct EmptyRequest {}

/// Error body returned with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    message: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            access_token: access_token.into(),
        }
    }

    fn game_url(&self, board_id: &str, action: &str) -> String {
        format!("{}/v1/game/{}/{}", self.base_url, board_id, action)
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: String, body: &B) -> ClientResult<T> {
        let request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(body);
        send(request).await
    }
}

/// Send a request and decode its JSON body, mapping error statuses to
/// [`ClientError::Rejected`].
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> ClientResult<T> {
    let body = fetch(request).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Send a request and return its body once the status is a success.
async fn fetch(request: reqwest::RequestBuilder) -> ClientResult<String> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Request(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(rejection(status.as_u16(), &body));
    }

    Ok(body)
}

fn rejection(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => ClientError::Rejected {
            code: error.code,
            message: error.message,
        },
        Err(_) => ClientError::Rejected {
            code: i64::from(status),
            message: if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[async_trait]
impl Authority for ApiClient {
    async fn enter(&self, board_id: &str) -> ClientResult<EnterResponse> {
        self.post(self.game_url(board_id, "enter"), &EmptyRequest {}).await
    }

    async fn hands(&self, board_id: &str, seat_key: &str) -> ClientResult<Option<[Card; 2]>> {
        let response: HandsResponse = self
            .post(self.game_url(board_id, "hands"), &SeatKeyRequest { seat_key })
            .await?;
        Ok(response.hands)
    }

    async fn stake(
        &self,
        board_id: &str,
        amount: Chips,
        seat_key: Option<&str>,
    ) -> ClientResult<StakeTicket> {
        let request = StakeRequest {
            chips: amount.to_string(),
            seat_key,
        };
        self.post(self.game_url(board_id, "stake"), &request).await
    }

    async fn bet(&self, board_id: &str, seat_key: &str, amount: Chips) -> ClientResult<BetTicket> {
        let request = BetRequest {
            seat_key,
            bet: amount.to_string(),
        };
        self.post(self.game_url(board_id, "bet"), &request).await
    }

    async fn redeem(&self, board_id: &str, seat_key: &str) -> ClientResult<RedeemTicket> {
        self.post(self.game_url(board_id, "redeem"), &SeatKeyRequest { seat_key })
            .await
    }

    async fn relay(&self, signed_tx: &str) -> ClientResult<RelayReceipt> {
        self.post(format!("{}/v1/txs", self.base_url), &RelayRequest { tx: signed_tx })
            .await
    }

    async fn ping(&self) -> ClientResult<()> {
        fetch(self.get(format!("{}/v1/game/ping", self.base_url))).await?;
        Ok(())
    }

    async fn boards(&self, query: &BoardQuery) -> ClientResult<BoardPage> {
        let request = self.get(format!("{}/v1/boards", self.base_url)).query(&[
            ("page", query.page.to_string()),
            ("minPlayers", query.min_players.to_string()),
            ("limit", query.limit.to_string()),
        ]);
        send(request).await
    }
}
