pub mod rarity;
