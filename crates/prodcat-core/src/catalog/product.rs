//! Field declarations for categories and product templates.
//!
//! Form generators and schema migrations consume these; the validator works
//! from the typed model instead.

use super::{
    DefaultValue, DeleteBehavior, DomainClause, EntityDef, FieldDef, FieldType, OrderBy, RelationDef,
    ScalarType, SchemaBundle,
};
use crate::constraint::ValidationConfig;
use crate::model::CategoryKind;

/// Category entity name.
pub const CATEGORY_ENTITY: &str = "product.category";

/// Product template entity name.
pub const TEMPLATE_ENTITY: &str = "product.template";

/// Edge entity linking templates to their categories.
pub const TEMPLATE_CATEGORY_ENTITY: &str = "product.template-product.category";

/// Relation name of the template category set.
pub const TEMPLATE_CATEGORIES: &str = "template_categories";

/// Build the schema bundle for categories and templates with the default
/// validation settings.
pub fn product_schema() -> SchemaBundle {
    product_schema_for(&ValidationConfig::default())
}

/// Build the schema bundle whose template domains match `config`.
pub fn product_schema_for(config: &ValidationConfig) -> SchemaBundle {
    SchemaBundle::new(0)
        .with_entity(category_entity())
        .with_entity(template_entity(config))
        .with_entity(template_category_entity())
        .with_relation(RelationDef::many_to_one(
            "category_parent",
            CATEGORY_ENTITY,
            "parent",
            CATEGORY_ENTITY,
        ))
        .with_relation(RelationDef::many_to_many(
            TEMPLATE_CATEGORIES,
            TEMPLATE_ENTITY,
            "categories",
            CATEGORY_ENTITY,
            TEMPLATE_CATEGORY_ENTITY,
        ))
        .with_relation(RelationDef::many_to_one(
            "template_accounting_category",
            TEMPLATE_ENTITY,
            "accounting_category",
            CATEGORY_ENTITY,
        )
        .with_on_delete(DeleteBehavior::SetNull))
}

fn category_entity() -> EntityDef {
    let view = CategoryKind::View.as_str();

    EntityDef::new(CATEGORY_ENTITY, "Product Category")
        .with_field(FieldDef::new(
            "name",
            "Name",
            FieldType::scalar(ScalarType::String),
        ))
        .with_field(FieldDef::optional(
            "parent",
            "Parent",
            FieldType::optional_reference(CATEGORY_ENTITY),
        ))
        .with_field(
            FieldDef::new(
                "kind",
                "Kind",
                FieldType::selection("kind", CategoryKind::SELECTION),
            )
            .with_default(DefaultValue::String(CategoryKind::Other.as_str().into())),
        )
        .with_field(
            FieldDef::optional("unique", "Unique", FieldType::scalar(ScalarType::Bool))
                .with_default(DefaultValue::Bool(false))
                .visible_when("kind", view),
        )
        .with_field(
            FieldDef::optional("required", "Required", FieldType::scalar(ScalarType::Bool))
                .with_default(DefaultValue::Bool(false))
                .visible_when("kind", view),
        )
        .with_field(
            FieldDef::optional(
                "accounting",
                "Accounting",
                FieldType::scalar(ScalarType::Bool),
            )
            .with_default(DefaultValue::Bool(false)),
        )
        .with_field(FieldDef::optional(
            "sequence",
            "Sequence",
            FieldType::optional_scalar(ScalarType::Int32),
        ))
        .with_order(OrderBy::asc("sequence"))
        .with_order(OrderBy::asc("name"))
}

fn template_entity(config: &ValidationConfig) -> EntityDef {
    // Same restrictions the validator applies to the tag set.
    let mut categories = FieldDef::optional(
        "categories",
        "Tags",
        FieldType::reference_set(TEMPLATE_CATEGORIES),
    );
    if !config.allow_view_assignment {
        categories =
            categories.with_domain(DomainClause::not_equals("kind", CategoryKind::View.as_str()));
    }
    categories = categories.with_domain(DomainClause::equals("accounting", "false"));

    EntityDef::new(TEMPLATE_ENTITY, "Product Template")
        .with_field(FieldDef::new(
            "name",
            "Name",
            FieldType::scalar(ScalarType::String),
        ))
        .with_field(categories)
        .with_field(
            FieldDef::optional(
                "accounting_category",
                "Account Category",
                FieldType::optional_reference(CATEGORY_ENTITY),
            )
            .with_domain(DomainClause::equals("accounting", "true")),
        )
        .with_order(OrderBy::asc("name"))
}

fn template_category_entity() -> EntityDef {
    EntityDef::new(TEMPLATE_CATEGORY_ENTITY, "Categories for products")
        .with_field(FieldDef::new(
            "product",
            "Product",
            FieldType::Reference {
                entity: TEMPLATE_ENTITY.into(),
            },
        ))
        .with_field(FieldDef::new(
            "category",
            "Category",
            FieldType::Reference {
                entity: CATEGORY_ENTITY.into(),
            },
        ))
}
