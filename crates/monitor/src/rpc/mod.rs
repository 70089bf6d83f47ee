use std::time::Duration;

use async_trait::async_trait;
use boa_supply_domain::model::Address;
use metrics::counter;
use num_bigint::BigUint;
use serde::Serialize;
use tracing::debug;

use crate::client::JsonRpcClient;
use crate::worker::MonitorError;

/// `keccak256("balanceOf(address)")[..4]`
const BALANCE_OF_SELECTOR: &str = "70a08231";
const LATEST_BLOCK: &str = "latest";

/// Balance of an address in the token contract on the token-issuing network.
#[async_trait]
pub trait TokenBalanceSource: Send + Sync {
    async fn token_balance(&self, address: &Address) -> Result<BigUint, MonitorError>;
}

/// Native-currency balance of an address on the secondary network.
#[async_trait]
pub trait NativeBalanceSource: Send + Sync {
    async fn native_balance(&self, address: &Address) -> Result<BigUint, MonitorError>;
}

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    to: &'a str,
    data: String,
}

/// Reads ERC-20 `balanceOf` through `eth_call`.
#[derive(Debug)]
pub struct RpcTokenSource {
    client: JsonRpcClient,
    contract: Address,
}

impl RpcTokenSource {
    pub fn new(client: JsonRpcClient, contract: Address) -> Self {
        Self { client, contract }
    }
}

#[async_trait]
impl TokenBalanceSource for RpcTokenSource {
    async fn token_balance(&self, address: &Address) -> Result<BigUint, MonitorError> {
        let call = CallRequest {
            to: self.contract.as_str(),
            data: encode_balance_of(address),
        };
        let result = self
            .client
            .call::<_, String>("eth_call", (call, LATEST_BLOCK))
            .await
            .and_then(|raw| parse_quantity(&raw));
        record_call("eth_call", &result);
        let balance = result?;
        debug!(%address, %balance, "token balance read");
        Ok(balance)
    }
}

/// Reads native balances through `eth_getBalance`.
#[derive(Debug)]
pub struct RpcNativeSource {
    client: JsonRpcClient,
}

impl RpcNativeSource {
    pub fn new(client: JsonRpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NativeBalanceSource for RpcNativeSource {
    async fn native_balance(&self, address: &Address) -> Result<BigUint, MonitorError> {
        let result = self
            .client
            .call::<_, String>("eth_getBalance", (address.as_str(), LATEST_BLOCK))
            .await
            .and_then(|raw| parse_quantity(&raw));
        record_call("eth_getBalance", &result);
        let balance = result?;
        debug!(%address, %balance, "native balance read");
        Ok(balance)
    }
}

/// Builds the token-network and secondary-network adapters.
pub fn build_rpc_sources(
    token_rpc_url: &str,
    native_rpc_url: &str,
    token_contract: Address,
    timeout: Duration,
) -> Result<(RpcTokenSource, RpcNativeSource), MonitorError> {
    let token = RpcTokenSource::new(JsonRpcClient::new(token_rpc_url, timeout)?, token_contract);
    let native = RpcNativeSource::new(JsonRpcClient::new(native_rpc_url, timeout)?);
    Ok((token, native))
}

fn record_call(method: &'static str, result: &Result<BigUint, MonitorError>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!("supply_rpc_calls_total", "method" => method, "result" => outcome).increment(1);
}

/// ABI-encodes `balanceOf(address)`: selector followed by the address
/// left-padded to 32 bytes.
pub fn encode_balance_of(address: &Address) -> String {
    format!("0x{BALANCE_OF_SELECTOR}{:0>64}", address.hex_body())
}

/// Parses a hex quantity (`0x`-prefixed) or a 32-byte ABI word into an
/// unsigned integer. An empty `0x` is rejected: it is what nodes return for
/// calls against an address without contract code.
pub fn parse_quantity(raw: &str) -> Result<BigUint, MonitorError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| MonitorError::Rpc(format!("quantity `{raw}` is missing 0x prefix")))?;
    if digits.is_empty() {
        return Err(MonitorError::Rpc("empty quantity returned".to_string()));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| MonitorError::Rpc(format!("malformed quantity `{raw}`")))
}
