//! Landing-page announcements, membership inquiries and contact messages.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
}

#[derive(Iden)]
enum Announcements {
    Table,
    Id,
    Message,
    IsActive,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
}

#[derive(Iden)]
enum MembershipInquiries {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum ContactMessages {
    Table,
    Id,
    UserId,
    Subject,
    Message,
    AttachmentUrl,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Announcements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Announcements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Announcements::Message).text().not_null())
                    .col(
                        ColumnDef::new(Announcements::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Announcements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Announcements::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Announcements::CreatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipInquiries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipInquiries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MembershipInquiries::Name).string().not_null())
                    .col(ColumnDef::new(MembershipInquiries::Email).string().not_null())
                    .col(ColumnDef::new(MembershipInquiries::Phone).string())
                    .col(ColumnDef::new(MembershipInquiries::Message).text().not_null())
                    .col(
                        ColumnDef::new(MembershipInquiries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactMessages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContactMessages::UserId).string().not_null())
                    .col(ColumnDef::new(ContactMessages::Subject).string().not_null())
                    .col(ColumnDef::new(ContactMessages::Message).text().not_null())
                    .col(ColumnDef::new(ContactMessages::AttachmentUrl).string())
                    .col(
                        ColumnDef::new(ContactMessages::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contact_messages-user_id")
                            .from(ContactMessages::Table, ContactMessages::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MembershipInquiries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Announcements::Table).to_owned())
            .await?;
        Ok(())
    }
}
