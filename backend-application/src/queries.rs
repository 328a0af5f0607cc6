pub mod attack_queries;
