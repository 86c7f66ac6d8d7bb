use sea_orm_migration::prelude::*;

pub struct OrdersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for OrdersMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateOrdersSchema)]
    }
}

pub struct CreateOrdersSchema;

impl MigrationName for CreateOrdersSchema {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_orders_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateOrdersSchema {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::ProductId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::Sku).string().not_null())
                    .col(
                        ColumnDef::new(Products::ActualStockLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::TargetStockLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::Retail).double().not_null())
                    .col(ColumnDef::new(Products::CurrentPrice).double().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::CustomerId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Title).string().not_null())
                    .col(ColumnDef::new(Customers::FirstName).string().not_null())
                    .col(ColumnDef::new(Customers::LastName).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::OrderId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::SpecialRequests).text().null())
                    .col(ColumnDef::new(Orders::OrderDiscount).double().not_null())
                    .col(ColumnDef::new(Orders::Tax).double().not_null())
                    .col(ColumnDef::new(Orders::ShippingAddress).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::CustomerId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderLines::OrderLineId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderLines::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderLines::ProductId).integer().not_null())
                    .col(ColumnDef::new(OrderLines::Quantity).integer().not_null())
                    .col(ColumnDef::new(OrderLines::Price).double().not_null())
                    .col(
                        ColumnDef::new(OrderLines::IsSubjectToTax)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(OrderLines::IsShipped)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_lines_order")
                            .from(OrderLines::Table, OrderLines::OrderId)
                            .to(Orders::Table, Orders::OrderId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_lines_product")
                            .from(OrderLines::Table, OrderLines::ProductId)
                            .to(Products::Table, Products::ProductId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first so foreign keys never dangle
        manager
            .drop_table(Table::drop().table(OrderLines::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    ProductId,
    Name,
    Description,
    Sku,
    ActualStockLevel,
    TargetStockLevel,
    Retail,
    CurrentPrice,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    CustomerId,
    Title,
    FirstName,
    LastName,
    Email,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    OrderId,
    CustomerId,
    Date,
    SpecialRequests,
    OrderDiscount,
    Tax,
    ShippingAddress,
}

#[derive(DeriveIden)]
enum OrderLines {
    Table,
    OrderLineId,
    OrderId,
    ProductId,
    Quantity,
    Price,
    IsSubjectToTax,
    IsShipped,
}
