//! Integration tests for template saves through the database.

use prodcat::{
    CategoryId, CategoryTree, Database, DatabaseConfig, Error, NewCategory, NewTemplate,
    SaveContext, Template, TemplateHook, ValidationConfig, ValidationError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct TestContext {
    db: Database,
    _dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self::with_validation(ValidationConfig::default())
    }

    fn with_validation(validation: ValidationConfig) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path()).with_validation(validation);
        let db = Database::open(config).unwrap();
        Self { db, _dir: dir }
    }
}

/// Size (required, unique view) with S and M below it, plus a loose tag.
struct Tree {
    size: CategoryId,
    small: CategoryId,
    medium: CategoryId,
    tag: CategoryId,
}

fn setup_tree(db: &Database) -> Tree {
    let size = db
        .create_category(NewCategory::new("Size").view().required().unique())
        .unwrap()
        .id;
    let small = db
        .create_category(NewCategory::new("S").with_parent(size))
        .unwrap()
        .id;
    let medium = db
        .create_category(NewCategory::new("M").with_parent(size))
        .unwrap()
        .id;
    let tag = db.create_category(NewCategory::new("Sale")).unwrap().id;

    Tree {
        size,
        small,
        medium,
        tag,
    }
}

#[test]
fn test_valid_template_saved() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let ids = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_categories([tree.small, tree.tag])],
            &SaveContext::default(),
        )
        .unwrap();

    assert_eq!(ids.len(), 1);
    let chair = ctx.db.template(ids[0]).unwrap().unwrap();
    assert_eq!(chair.categories, vec![tree.small, tree.tag]);
    assert_eq!(ctx.db.templates_with_category(tree.small).unwrap(), ids);
}

#[test]
fn test_missing_required_rejected() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_category(tree.tag)],
            &SaveContext::default(),
        )
        .unwrap_err();

    let validation = err.validation().unwrap();
    assert_eq!(validation.message_key(), "missing_categories");
    assert_eq!(
        err.to_string(),
        "The template Chair is missing some required categories: Size"
    );
    assert!(ctx.db.templates().unwrap().is_empty());
}

#[test]
fn test_repeated_unique_rejected() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_categories([tree.small, tree.medium])],
            &SaveContext::default(),
        )
        .unwrap_err();

    assert!(matches!(
        err.validation(),
        Some(ValidationError::RepeatedUniqueCategory { category, .. }) if category == "Size"
    ));
}

#[test]
fn test_failed_batch_rolls_back() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let result = ctx.db.save_templates(
        vec![
            NewTemplate::new("Good").with_category(tree.small),
            NewTemplate::new("Bad").with_categories([tree.small, tree.medium]),
        ],
        &SaveContext::default(),
    );

    assert!(result.is_err());
    assert!(ctx.db.templates().unwrap().is_empty());
    assert!(ctx.db.templates_with_category(tree.small).unwrap().is_empty());
}

#[test]
fn test_bypass_saves_invalid_template() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let ids = ctx
        .db
        .save_templates(
            vec![
                NewTemplate::new("Nothing"),
                NewTemplate::new("Both").with_categories([tree.small, tree.medium]),
            ],
            &SaveContext::bypass(),
        )
        .unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(ctx.db.templates().unwrap().len(), 2);
}

#[test]
fn test_update_is_validated() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let ids = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_category(tree.small)],
            &SaveContext::default(),
        )
        .unwrap();

    let mut chair = ctx.db.template(ids[0]).unwrap().unwrap();
    chair.set_categories([tree.tag]);
    assert!(ctx
        .db
        .write_templates(vec![chair.clone()], &SaveContext::default())
        .is_err());

    let stored = ctx.db.template(ids[0]).unwrap().unwrap();
    assert_eq!(stored.categories, vec![tree.small]);

    chair.set_categories([tree.medium, tree.tag]);
    ctx.db
        .write_templates(vec![chair], &SaveContext::default())
        .unwrap();
    let stored = ctx.db.template(ids[0]).unwrap().unwrap();
    assert_eq!(stored.categories, vec![tree.medium, tree.tag]);
}

#[test]
fn test_required_root_alone_configurable() {
    let strict = TestContext::new();
    let tree = setup_tree(&strict.db);
    assert!(strict
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_category(tree.size)],
            &SaveContext::default(),
        )
        .is_err());

    let lenient =
        TestContext::with_validation(ValidationConfig::default().with_required_accepts_self(true));
    let tree = setup_tree(&lenient.db);
    assert!(lenient
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_category(tree.size)],
            &SaveContext::default(),
        )
        .is_ok());
}

#[test]
fn test_accounting_category_domain() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);
    let revenue = ctx
        .db
        .create_category(NewCategory::new("Revenue").accounting())
        .unwrap()
        .id;

    let ok = ctx.db.save_templates(
        vec![NewTemplate::new("Chair")
            .with_category(tree.small)
            .with_accounting_category(revenue)],
        &SaveContext::default(),
    );
    assert!(ok.is_ok());

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Desk").with_categories([tree.small, revenue])],
            &SaveContext::default(),
        )
        .unwrap_err();
    assert_eq!(err.validation().unwrap().message_key(), "invalid_category");

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Desk")
                .with_category(tree.small)
                .with_accounting_category(tree.tag)],
            &SaveContext::default(),
        )
        .unwrap_err();
    assert_eq!(
        err.validation().unwrap().message_key(),
        "invalid_accounting_category"
    );
}

#[test]
fn test_new_constraint_applies_to_later_saves() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let colour = ctx
        .db
        .create_category(NewCategory::new("Colour").view())
        .unwrap();
    let red = ctx
        .db
        .create_category(NewCategory::new("Red").with_parent(colour.id))
        .unwrap();

    let mut required = colour.clone();
    required.required = true;
    ctx.db.write_category(&required).unwrap();

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_category(tree.small)],
            &SaveContext::default(),
        )
        .unwrap_err();
    assert!(err.to_string().ends_with("Colour"));

    assert!(ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_categories([tree.small, red.id])],
            &SaveContext::default(),
        )
        .is_ok());
}

#[test]
fn test_category_lifecycle() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    assert_eq!(ctx.db.category_rec_name(tree.small).unwrap(), "Size / S");
    assert!(matches!(
        ctx.db.delete_category(tree.size),
        Err(Error::Core(prodcat_core::Error::HasChildren { children: 2, .. }))
    ));

    let mut size = ctx.db.category(tree.size).unwrap().unwrap();
    size.parent = Some(tree.small);
    assert!(matches!(
        ctx.db.write_category(&size),
        Err(Error::Core(prodcat_core::Error::Recursion(_)))
    ));

    ctx.db.delete_category(tree.tag).unwrap();
    assert!(ctx.db.category(tree.tag).unwrap().is_none());
    assert_eq!(ctx.db.store().children(tree.size).unwrap().len(), 2);
}

#[test]
fn test_delete_templates() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);

    let ids = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_category(tree.small)],
            &SaveContext::default(),
        )
        .unwrap();
    ctx.db.delete_templates(&ids).unwrap();

    assert!(ctx.db.template(ids[0]).unwrap().is_none());
    assert!(ctx.db.templates_with_category(tree.small).unwrap().is_empty());
}

struct NoEmptyNames;

impl TemplateHook for NoEmptyNames {
    fn name(&self) -> &str {
        "no_empty_names"
    }

    fn validate(
        &self,
        _tree: &dyn CategoryTree,
        templates: &[Template],
        _ctx: &SaveContext,
    ) -> Result<(), prodcat_core::Error> {
        match templates.iter().find(|t| t.name.is_empty()) {
            Some(t) => Err(prodcat_core::Error::InvalidData(format!(
                "template {} has no name",
                t.id
            ))),
            None => Ok(()),
        }
    }
}

#[test]
fn test_custom_hook() {
    let ctx = TestContext::new();
    let tree = setup_tree(&ctx.db);
    ctx.db.register_hook(NoEmptyNames);
    assert_eq!(
        ctx.db.hook_names(),
        vec!["category_constraints".to_string(), "no_empty_names".to_string()]
    );

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("").with_category(tree.small)],
            &SaveContext::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Core(prodcat_core::Error::InvalidData(_))
    ));
}

#[test]
fn test_reopen_keeps_data() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let id;

    {
        let db = Database::open(DatabaseConfig::new(dir.path())).unwrap();
        let tree = setup_tree(&db);
        id = db
            .save_templates(
                vec![NewTemplate::new("Chair").with_category(tree.medium)],
                &SaveContext::default(),
            )
            .unwrap()[0];
        db.flush().unwrap();
    }

    let db = Database::open(DatabaseConfig::new(dir.path())).unwrap();
    let chair = db.template(id).unwrap().unwrap();
    assert_eq!(chair.name, "Chair");
    assert_eq!(chair.categories.len(), 1);
    assert_eq!(
        db.category_rec_name(chair.categories[0]).unwrap(),
        "Size / M"
    );
}

#[test]
fn test_catalog_domain_matches_validation() {
    use prodcat_core::catalog::{product::TEMPLATE_ENTITY, DomainClause};

    let ctx = TestContext::with_validation(ValidationConfig::default().with_view_assignment(false));
    let tree = setup_tree(&ctx.db);

    let tags = ctx
        .db
        .store()
        .catalog()
        .get_entity(TEMPLATE_ENTITY)
        .and_then(|e| e.get_field("categories").cloned())
        .unwrap();
    assert!(tags.domain.contains(&DomainClause::not_equals("kind", "view")));

    let err = ctx
        .db
        .save_templates(
            vec![NewTemplate::new("Chair").with_categories([tree.size, tree.small])],
            &SaveContext::default(),
        )
        .unwrap_err();
    assert_eq!(err.validation().unwrap().message_key(), "invalid_category");
}
