use std::sync::Arc;

use async_trait::async_trait;
use boa_supply_domain::config::SupplyLedger;
use boa_supply_domain::model::{rescale, rescale_signed, Address, SupplySnapshot};
use boa_supply_domain::storage::RewardStore;
use boa_supply_domain::{PublishOutcome, SupplyPublisher};
use futures::future::try_join_all;
use num_bigint::{BigInt, BigUint};
use tracing::{debug, info};

use crate::rpc::{NativeBalanceSource, TokenBalanceSource};
use crate::worker::{MonitorError, SupplyJob};

/// Raw per-tick readings, before rescaling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyInputs {
    pub foundation: BigUint,
    pub marketing: BigUint,
    pub bounty: BigUint,
    pub team: BigUint,
    pub burned: BigUint,
    pub auxiliary: BigUint,
    pub locked_airdrop: BigUint,
    /// Native balance in the secondary network's own precision.
    pub commons_budget_raw: BigUint,
    /// Reward aggregate in the database's precision; `None` when SQL `NULL`.
    pub reward_raw: Option<BigInt>,
}

/// Applies the supply formula to one set of readings.
///
/// `total = initial + reward / 10^r + commons / 10^n - burned`
/// `circulating = total - (foundation + marketing + bounty + bridge reserves
/// + team + locked airdrops + commons + auxiliary)`
pub fn compute_snapshot(
    ledger: &SupplyLedger,
    inputs: &SupplyInputs,
) -> Result<SupplySnapshot, MonitorError> {
    let commons_budget = rescale(&inputs.commons_budget_raw, ledger.native_scale_exponent);
    let reward = rescale_signed(
        &inputs.reward_raw.clone().unwrap_or_default(),
        ledger.reward_scale_exponent,
    );
    debug!(%commons_budget, %reward, "rescaled secondary sources");

    let total = BigInt::from(ledger.initial_supply.clone()) + reward
        + BigInt::from(commons_budget.clone())
        - BigInt::from(inputs.burned.clone());
    let total = BigUint::try_from(total.clone()).map_err(|_| MonitorError::NegativeSupply {
        figure: "total",
        value: total.to_string(),
    })?;

    let excluded = &inputs.foundation
        + &inputs.marketing
        + &inputs.bounty
        + &ledger.bridge_liquidity
        + &ledger.bridge_foundation_liquidity
        + &inputs.team
        + &inputs.locked_airdrop
        + &commons_budget
        + &inputs.auxiliary;
    if excluded > total {
        let deficit = BigInt::from(total) - BigInt::from(excluded);
        return Err(MonitorError::NegativeSupply {
            figure: "circulating",
            value: deficit.to_string(),
        });
    }
    let circulating = &total - &excluded;

    Ok(SupplySnapshot::new(total, circulating))
}

/// Reads every source for one tick, combines them and offers the result to
/// the publisher. Any failed read aborts before the publisher is touched.
pub struct SupplyCalculator<T, N, R> {
    token: T,
    native: N,
    rewards: R,
    ledger: SupplyLedger,
    publisher: Arc<SupplyPublisher>,
}

impl<T, N, R> SupplyCalculator<T, N, R>
where
    T: TokenBalanceSource,
    N: NativeBalanceSource,
    R: RewardStore,
{
    pub fn new(
        token: T,
        native: N,
        rewards: R,
        ledger: SupplyLedger,
        publisher: Arc<SupplyPublisher>,
    ) -> Self {
        Self {
            token,
            native,
            rewards,
            ledger,
            publisher,
        }
    }

    pub fn ledger(&self) -> &SupplyLedger {
        &self.ledger
    }

    pub fn publisher(&self) -> &Arc<SupplyPublisher> {
        &self.publisher
    }

    /// Issues all reads concurrently; latency is bounded by the slowest one.
    pub async fn gather(&self) -> Result<SupplyInputs, MonitorError> {
        let ledger = &self.ledger;
        let (
            foundation,
            marketing,
            bounty,
            team,
            burned,
            auxiliary,
            locked_airdrop,
            commons_budget_raw,
            reward_raw,
        ) = tokio::try_join!(
            self.token.token_balance(&ledger.foundation),
            self.sum_token_balances(&ledger.marketing),
            self.token.token_balance(&ledger.bounty),
            self.token.token_balance(&ledger.team),
            self.token.token_balance(&ledger.burn),
            self.sum_token_balances(&ledger.auxiliary),
            self.sum_token_balances(&ledger.locked_airdrop),
            self.native.native_balance(&ledger.commons_budget),
            async {
                self.rewards
                    .reward_aggregate(ledger.reward_formula)
                    .await
                    .map_err(MonitorError::from)
            },
        )?;

        Ok(SupplyInputs {
            foundation,
            marketing,
            bounty,
            team,
            burned,
            auxiliary,
            locked_airdrop,
            commons_budget_raw,
            reward_raw,
        })
    }

    async fn sum_token_balances(&self, addresses: &[Address]) -> Result<BigUint, MonitorError> {
        let balances =
            try_join_all(addresses.iter().map(|address| self.token.token_balance(address)))
                .await?;
        Ok(balances.into_iter().sum())
    }

    pub async fn run_once(&self) -> Result<PublishOutcome, MonitorError> {
        let inputs = self.gather().await?;
        debug!(?inputs, "supply inputs gathered");

        let candidate = compute_snapshot(&self.ledger, &inputs)?;
        info!(
            total_supply = %candidate.total_supply,
            circulating_supply = %candidate.circulating_supply,
            "supply candidate computed"
        );
        Ok(self.publisher.publish(candidate))
    }
}

#[async_trait]
impl<T, N, R> SupplyJob for SupplyCalculator<T, N, R>
where
    T: TokenBalanceSource + 'static,
    N: NativeBalanceSource + 'static,
    R: RewardStore + 'static,
{
    async fn tick(&self) -> Result<PublishOutcome, MonitorError> {
        self.run_once().await
    }
}
