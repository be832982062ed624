//! Integration tests for the Recipe repository using in-memory
//! SurrealDB.

use larder_core::error::LarderError;
use larder_core::models::ingredient::CreateIngredient;
use larder_core::models::recipe::{CreateRecipe, UpdateRecipe};
use larder_core::models::tag::CreateTag;
use larder_core::models::user::CreateUser;
use larder_core::repository::{
    IngredientRepository, Pagination, RecipeRepository, TagRepository, UserRepository,
};
use larder_db::repository::{
    SurrealIngredientRepository, SurrealRecipeRepository, SurrealTagRepository,
    SurrealUserRepository,
};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create a user.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    larder_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            email: "cook@example.com".into(),
            password: "pass123".into(),
            name: "Cook".into(),
        })
        .await
        .unwrap();

    (db, user.id)
}

async fn create_user(db: &Surreal<surrealdb::engine::local::Db>, email: &str) -> Uuid {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: email.into(),
            password: "pass123".into(),
            name: String::new(),
        })
        .await
        .unwrap()
        .id
}

fn sample_recipe(owner: Uuid) -> CreateRecipe {
    CreateRecipe {
        owner,
        title: "Avocado lime cheesecake".into(),
        time_minutes: 60,
        price: Decimal::new(2000, 2), // 20.00
        link: None,
        ingredients: Vec::new(),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn create_recipe_with_references() {
    let (db, owner) = setup().await;
    let tag = SurrealTagRepository::new(db.clone())
        .create(CreateTag {
            owner,
            name: "Dessert".into(),
        })
        .await
        .unwrap();
    let ingredient = SurrealIngredientRepository::new(db.clone())
        .create(CreateIngredient {
            owner,
            name: "Avocado".into(),
        })
        .await
        .unwrap();

    let repo = SurrealRecipeRepository::new(db);
    let recipe = repo
        .create(CreateRecipe {
            ingredients: vec![ingredient.id],
            tags: vec![tag.id],
            ..sample_recipe(owner)
        })
        .await
        .unwrap();

    assert_eq!(recipe.title, "Avocado lime cheesecake");
    assert_eq!(recipe.to_string(), "Avocado lime cheesecake");
    assert_eq!(recipe.time_minutes, 60);
    assert_eq!(recipe.price, Decimal::new(2000, 2));
    assert_eq!(recipe.ingredients, vec![ingredient.id]);
    assert_eq!(recipe.tags, vec![tag.id]);
    assert!(recipe.image.is_none());

    let fetched = repo.get_by_id(owner, recipe.id).await.unwrap();
    assert_eq!(fetched.ingredients, vec![ingredient.id]);
    assert_eq!(fetched.tags, vec![tag.id]);
}

#[tokio::test]
async fn recipe_requires_existing_owner() {
    let (db, _owner) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let result = repo.create(sample_recipe(Uuid::new_v4())).await;
    assert!(matches!(
        result,
        Err(LarderError::ReferentialIntegrity { .. })
    ));
}

#[tokio::test]
async fn recipe_requires_existing_references() {
    let (db, owner) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let result = repo
        .create(CreateRecipe {
            ingredients: vec![Uuid::new_v4()],
            ..sample_recipe(owner)
        })
        .await;
    assert!(matches!(
        result,
        Err(LarderError::ReferentialIntegrity { .. })
    ));

    let result = repo
        .create(CreateRecipe {
            tags: vec![Uuid::new_v4()],
            ..sample_recipe(owner)
        })
        .await;
    assert!(matches!(
        result,
        Err(LarderError::ReferentialIntegrity { .. })
    ));
}

#[tokio::test]
async fn references_may_belong_to_another_user() {
    let (db, owner) = setup().await;
    let other = create_user(&db, "neighbor@example.com").await;

    // The neighbor's ingredient is linkable from this owner's recipe.
    let ingredient = SurrealIngredientRepository::new(db.clone())
        .create(CreateIngredient {
            owner: other,
            name: "Borrowed butter".into(),
        })
        .await
        .unwrap();

    let repo = SurrealRecipeRepository::new(db);
    let recipe = repo
        .create(CreateRecipe {
            ingredients: vec![ingredient.id],
            ..sample_recipe(owner)
        })
        .await
        .unwrap();

    assert_eq!(recipe.ingredients, vec![ingredient.id]);
}

#[tokio::test]
async fn update_partial_fields() {
    let (db, owner) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo
        .create(CreateRecipe {
            link: Some("https://example.com/cheesecake".into()),
            ..sample_recipe(owner)
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            owner,
            recipe.id,
            UpdateRecipe {
                title: Some("Lime cheesecake".into()),
                price: Some(Decimal::new(1550, 2)),
                link: Some(None), // clear
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Lime cheesecake");
    assert_eq!(updated.price, Decimal::new(1550, 2));
    assert_eq!(updated.time_minutes, 60); // unchanged
    assert!(updated.link.is_none());
}

#[tokio::test]
async fn update_replaces_reference_sets() {
    let (db, owner) = setup().await;
    let tag_repo = SurrealTagRepository::new(db.clone());
    let old_tag = tag_repo
        .create(CreateTag {
            owner,
            name: "Old".into(),
        })
        .await
        .unwrap();
    let new_tag = tag_repo
        .create(CreateTag {
            owner,
            name: "New".into(),
        })
        .await
        .unwrap();

    let repo = SurrealRecipeRepository::new(db);
    let recipe = repo
        .create(CreateRecipe {
            tags: vec![old_tag.id],
            ..sample_recipe(owner)
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            owner,
            recipe.id,
            UpdateRecipe {
                tags: Some(vec![new_tag.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tags, vec![new_tag.id]);

    // Clearing works too.
    let cleared = repo
        .update(
            owner,
            recipe.id,
            UpdateRecipe {
                tags: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test]
async fn recipes_are_owner_scoped() {
    let (db, owner) = setup().await;
    let other = create_user(&db, "other@example.com").await;

    let repo = SurrealRecipeRepository::new(db);
    let recipe = repo.create(sample_recipe(owner)).await.unwrap();

    let result = repo.get_by_id(other, recipe.id).await;
    assert!(matches!(result, Err(LarderError::NotFound { .. })));

    let result = repo
        .update(
            other,
            recipe.id,
            UpdateRecipe {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(LarderError::NotFound { .. })));

    let page = repo.list_by_owner(other, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn set_image_generates_fresh_path() {
    let (db, owner) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo.create(sample_recipe(owner)).await.unwrap();

    let updated = repo
        .set_image(owner, recipe.id, "photo.JPG")
        .await
        .unwrap();
    let path = updated.image.unwrap();

    let rest = path.strip_prefix("uploads/recipe/").unwrap();
    let (stem, ext) = rest.rsplit_once('.').unwrap();
    assert_eq!(ext, "JPG");
    assert!(Uuid::parse_str(stem).is_ok());
    assert!(!path.contains("photo"));

    // A second upload gets a fresh identifier.
    let again = repo
        .set_image(owner, recipe.id, "photo.JPG")
        .await
        .unwrap();
    assert_ne!(again.image.unwrap(), path);
}

#[tokio::test]
async fn list_recipes_newest_first() {
    let (db, owner) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    for title in ["First", "Second", "Third"] {
        repo.create(CreateRecipe {
            title: title.into(),
            ..sample_recipe(owner)
        })
        .await
        .unwrap();
    }

    let page = repo.list_by_owner(owner, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.first().unwrap().title, "Third");
}

#[tokio::test]
async fn delete_recipe_keeps_referenced_rows() {
    let (db, owner) = setup().await;
    let tag_repo = SurrealTagRepository::new(db.clone());
    let tag = tag_repo
        .create(CreateTag {
            owner,
            name: "Survivor".into(),
        })
        .await
        .unwrap();

    let repo = SurrealRecipeRepository::new(db);
    let recipe = repo
        .create(CreateRecipe {
            tags: vec![tag.id],
            ..sample_recipe(owner)
        })
        .await
        .unwrap();

    repo.delete(owner, recipe.id).await.unwrap();

    let result = repo.get_by_id(owner, recipe.id).await;
    assert!(matches!(result, Err(LarderError::NotFound { .. })));

    // The tag outlives the recipe that referenced it.
    assert!(tag_repo.get_by_id(owner, tag.id).await.is_ok());
}

#[tokio::test]
async fn deleting_tag_detaches_it_from_recipes() {
    let (db, owner) = setup().await;
    let tag_repo = SurrealTagRepository::new(db.clone());
    let tag = tag_repo
        .create(CreateTag {
            owner,
            name: "Fleeting".into(),
        })
        .await
        .unwrap();

    let repo = SurrealRecipeRepository::new(db);
    let recipe = repo
        .create(CreateRecipe {
            tags: vec![tag.id],
            ..sample_recipe(owner)
        })
        .await
        .unwrap();

    tag_repo.delete(owner, tag.id).await.unwrap();

    let fetched = repo.get_by_id(owner, recipe.id).await.unwrap();
    assert!(fetched.tags.is_empty());
}
