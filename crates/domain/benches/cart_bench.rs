use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Cart, CartId, CartService, Entity, InMemoryRepository, Product, ProductId, ProductRepository,
    Recipe, RecipeId, RecipeRepository, RecipeService,
};

fn product(id: i64) -> Product {
    let mut product = Product::new(format!("Product {id}"), id * 10).unwrap();
    product.assign_id(ProductId::new(id).unwrap()).unwrap();
    product
}

fn saved_cart() -> Cart {
    let mut cart = Cart::new();
    cart.assign_id(CartId::new(1).unwrap()).unwrap();
    cart
}

fn bench_create_items(c: &mut Criterion) {
    let products: Vec<Product> = (1..=50).map(product).collect();
    let recipes: Vec<RecipeId> = (1..=10).map(|id| RecipeId::new(id).unwrap()).collect();

    c.bench_function("cart/create_item_overlapping_recipes", |b| {
        b.iter(|| {
            let mut cart = saved_cart();
            for (offset, recipe_id) in recipes.iter().enumerate() {
                for product in products.iter().skip(offset * 3).take(20) {
                    cart.create_item(product, *recipe_id).unwrap();
                }
            }
            cart
        });
    });
}

fn bench_remove_recipe_items(c: &mut Criterion) {
    let products: Vec<Product> = (1..=50).map(product).collect();
    let recipes: Vec<RecipeId> = (1..=10).map(|id| RecipeId::new(id).unwrap()).collect();
    let mut filled = saved_cart();
    for (offset, recipe_id) in recipes.iter().enumerate() {
        for product in products.iter().skip(offset * 3).take(20) {
            filled.create_item(product, *recipe_id).unwrap();
        }
    }

    c.bench_function("cart/remove_recipe_items", |b| {
        b.iter(|| {
            let mut cart = filled.clone();
            for recipe_id in &recipes {
                cart.remove_recipe_items(*recipe_id).unwrap();
            }
            cart
        });
    });
}

fn bench_add_recipe_service(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryRepository::new();
    let service = CartService::new(store.clone(), RecipeService::new(store.clone()));

    let recipe_id = rt.block_on(async {
        let mut recipe = Recipe::new("Bench Recipe");
        for i in 1..=10 {
            let product = ProductRepository::save(&store, Product::new(format!("P{i}"), i).unwrap())
                .await
                .unwrap();
            recipe.add_product(product);
        }
        RecipeRepository::save(&store, recipe)
            .await
            .unwrap()
            .id()
            .unwrap()
    });

    c.bench_function("service/create_cart_with_recipe", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.create_cart_with_recipe(recipe_id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_items,
    bench_remove_recipe_items,
    bench_add_recipe_service
);
criterion_main!(benches);
