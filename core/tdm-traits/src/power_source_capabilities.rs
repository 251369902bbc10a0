//! Enums of `weave.trait.power.PowerSourceCapabilitiesTrait`.

trait_enum! {
    /// Kind of power source.
    pub enum PowerSourceType: "PowerSourceType" {
        Battery = 1,
    }
}

trait_enum! {
    /// Current delivered by the source.
    pub enum PowerSourceCurrentType: "PowerSourceCurrentType" {
        Dc = 1,
        Ac = 2,
    }
}
