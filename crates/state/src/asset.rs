use types::{Address, AssetParamsFields};

/// An asset's durable definition, created by an `acfg` transaction with
/// `ConfigAsset == 0` and mutable thereafter only by its manager.
#[derive(Clone, Debug)]
pub struct AssetDefinition {
    pub asset_id: u64,
    pub creator: Address,
    pub params: AssetParamsFields,
}

impl AssetDefinition {
    pub fn manager_is(&self, addr: &Address) -> bool {
        !self.params.manager.is_zero() && &self.params.manager == addr
    }

    pub fn freeze_role_is(&self, addr: &Address) -> bool {
        !self.params.freeze.is_zero() && &self.params.freeze == addr
    }

    pub fn clawback_role_is(&self, addr: &Address) -> bool {
        !self.params.clawback.is_zero() && &self.params.clawback == addr
    }
}
