pub mod validators {
    use sea_orm::entity::prelude::*;

    /// Per-validator balances maintained by the chain scanner. Only the
    /// columns the reward aggregate touches are mapped.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "validators")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub address: String,
        pub balance: i64,
        pub withdrawal: i64,
        #[sea_orm(column_name = "balanceactivation")]
        pub balance_activation: i64,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
