use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub total_points: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::claim_records::Entity")]
    ClaimRecords,
}

impl Related<super::claim_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClaimRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
