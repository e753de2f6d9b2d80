//! The category setup shipped with the product category module's own tests.

use prodcat::{Database, NewCategory, NewTemplate, SaveContext};

#[test]
fn test_product_category_module() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let db = Database::open_temporary().unwrap();

    let category = db.create_category(NewCategory::new("Category")).unwrap();
    let cat1 = db
        .create_category(NewCategory::new("Cat1").view().required().unique())
        .unwrap();
    let cat1a = db
        .create_category(NewCategory::new("Cat1a").with_parent(cat1.id))
        .unwrap();

    let err = db
        .save_templates(
            vec![NewTemplate::new("Template").with_category(category.id)],
            &SaveContext::default(),
        )
        .unwrap_err();
    assert_eq!(err.validation().unwrap().params()[0], "Template");

    let ids = db
        .save_templates(
            vec![NewTemplate::new("Template").with_categories([category.id, cat1.id, cat1a.id])],
            &SaveContext::default(),
        )
        .unwrap();

    let template = db.template(ids[0]).unwrap().unwrap();
    assert_eq!(template.categories, vec![category.id, cat1.id, cat1a.id]);
}
