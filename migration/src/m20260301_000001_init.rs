use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== READINGS ==========
        // ts is the primary key: one chemistry snapshot per millisecond timestamp.
        manager
            .create_table(
                Table::create()
                    .table(Readings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Readings::Ts)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Readings::Fc).double())
                    .col(ColumnDef::new(Readings::Tc).double())
                    .col(ColumnDef::new(Readings::Ph).double())
                    .col(ColumnDef::new(Readings::Ta).integer())
                    .col(ColumnDef::new(Readings::Ca).integer())
                    .col(ColumnDef::new(Readings::Cya).integer())
                    .col(ColumnDef::new(Readings::PoolTemp).double())
                    .col(ColumnDef::new(Readings::AirTemp).double())
                    .col(ColumnDef::new(Readings::CpuTemp).double())
                    .to_owned(),
            )
            .await?;

        // ========== EVENTS ==========
        // Each event belongs to exactly one reading; deleting the reading
        // deletes its events (requires PRAGMA foreign_keys, on by default
        // with sqlx-sqlite).
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::EventId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::EventType).string_len(32).not_null())
                    .col(ColumnDef::new(Events::Quantity).double())
                    .col(ColumnDef::new(Events::Comment).text())
                    .col(ColumnDef::new(Events::ReadingTs).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_reading")
                            .from(Events::Table, Events::ReadingTs)
                            .to(Readings::Table, Readings::Ts)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("events_reading_ts_idx")
                    .table(Events::Table)
                    .col(Events::ReadingTs)
                    .to_owned(),
            )
            .await?;

        // ========== SETTINGS ==========
        // Values stored as text, interpreted per-name at the application boundary.
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Name)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::Value).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Readings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Readings {
    Table,
    Ts,
    Fc,
    Tc,
    Ph,
    Ta,
    Ca,
    Cya,
    PoolTemp,
    AirTemp,
    CpuTemp,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    EventId,
    EventType,
    Quantity,
    Comment,
    ReadingTs,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Name,
    Value,
}
