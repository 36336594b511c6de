pub mod mods;
