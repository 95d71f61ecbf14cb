pub mod cyber_attack;
