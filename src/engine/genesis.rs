//! Genesis import and export.

use tracing::info;

use super::config::MARKET_NAME_SEQUENCE_KEY;
use super::core::Engine;
use crate::collaborators::SequenceGenerator;
use crate::error::MarketError;
use crate::genesis::GenesisState;
use crate::store::MarketStore;

impl<S: MarketStore> Engine<S> {
    /// Loads a validated snapshot. markets go through the indexed write path
    /// without hooks or events.
    pub fn init_genesis(
        &mut self,
        state: &GenesisState,
        sequence: &mut dyn SequenceGenerator,
    ) -> Result<(), MarketError> {
        state.validate()?;
        self.config.params = state.params.clone();
        self.config.controlled_params = state.controlled_params.clone();
        for market in &state.markets {
            let previous = self.get_market(&market.name)?;
            self.write_market(previous.as_ref(), market)?;
        }
        for structure in &state.fee_structures {
            self.fees.set(structure.clone())?;
        }
        sequence.set(MARKET_NAME_SEQUENCE_KEY, state.market_name_sequence);
        info!(
            markets = state.markets.len(),
            fee_structures = state.fee_structures.len(),
            "Imported genesis"
        );
        Ok(())
    }

    pub fn export_genesis(&self, sequence: &dyn SequenceGenerator) -> Result<GenesisState, MarketError> {
        Ok(GenesisState {
            params: self.config.params.clone(),
            controlled_params: self.config.controlled_params.clone(),
            markets: self.get_all_markets()?,
            fee_structures: self.fees.structures(),
            market_name_sequence: sequence.current(MARKET_NAME_SEQUENCE_KEY),
        })
    }
}
