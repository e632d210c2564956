mod attack_village;

pub use attack_village::AttackVillageCommandHandler;
