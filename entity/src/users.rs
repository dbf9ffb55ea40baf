use sea_orm::entity::prelude::*;

/// Registered account. `gender` and `auth_provider` hold the variant names
/// (`FEMALE`, `GOOGLE`, ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub surname: String,
    pub age: i32,
    pub gender: String,
    pub city: Option<String>,
    pub state: Option<String>,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: Option<String>,
    pub auth_provider: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
