pub mod premium_sweep;
