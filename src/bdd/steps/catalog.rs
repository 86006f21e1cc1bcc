use anyhow::{bail, ensure};
use cucumber::{then, when};

use super::buttons;
use crate::bdd::world::ShopWorld;
use crate::pages::Screen;

#[then(expr = "el usuario debería ser redirigido al inventario")]
async fn redirected_to_inventory(world: &mut ShopWorld) -> anyhow::Result<()> {
    world.pages()?.inventory.wait_until_loaded().await?;
    world.record("Redirección al inventario").await;
    Ok(())
}

#[then(expr = "debería ver la lista de productos disponibles")]
async fn sees_product_list(world: &mut ShopWorld) -> anyhow::Result<()> {
    let inventory = &world.pages()?.inventory;
    let names = inventory.product_names().await?;
    world
        .record(format!("Productos disponibles: {}", names.join(", ")))
        .await;
    ensure!(!names.is_empty(), "No products listed in the catalog");
    Ok(())
}

#[then(expr = "debería ver la página del inventario")]
async fn sees_inventory(world: &mut ShopWorld) -> anyhow::Result<()> {
    let loaded = world.pages()?.inventory.is_loaded().await;
    world.record(format!("Página del inventario cargada: {}", loaded)).await;
    ensure!(loaded, "Inventory screen is not shown");
    Ok(())
}

#[when(expr = "el usuario selecciona el producto {string}")]
async fn select_product(world: &mut ShopWorld, product: String) -> anyhow::Result<()> {
    let inventory = &world.pages()?.inventory;
    inventory.scroll_to_product(&product).await?;
    let present = inventory.is_product_present(&product).await?;
    world
        .record(format!("Producto: {}, Presente: {}", product, present))
        .await;
    ensure!(present, "Product '{}' is not in the catalog", product);
    world.selected_product = Some(product);
    Ok(())
}

#[when(expr = "presiona el botón {string}")]
async fn press_product_button(world: &mut ShopWorld, label: String) -> anyhow::Result<()> {
    let product = world
        .selected_product
        .clone()
        .unwrap_or_else(|| world.journey().default_product.clone());
    let inventory = world.pages()?.inventory.clone();
    world.cart_count = inventory.cart_items_count().await;

    match label.as_str() {
        buttons::ADD_TO_CART => {
            inventory.add_product_to_cart(&product).await?;
            world.cart_products.push(product.clone());
        }
        buttons::REMOVE => {
            inventory.remove_product_from_cart(&product).await?;
            world.cart_products.retain(|p| p != &product);
        }
        other => bail!("Unknown catalog button '{}'", other),
    }

    world
        .record(format!("Botón '{}' presionado para {}", label, product))
        .await;
    Ok(())
}

#[then(expr = "el botón debería cambiar a {string}")]
async fn button_changes_to(world: &mut ShopWorld, expected: String) -> anyhow::Result<()> {
    let product = world
        .selected_product
        .clone()
        .unwrap_or_else(|| world.journey().default_product.clone());
    let inventory = &world.pages()?.inventory;

    let changed = match expected.as_str() {
        buttons::REMOVE => inventory.is_product_in_cart(&product).await,
        buttons::ADD_TO_CART => inventory.can_add_product_to_cart(&product).await,
        other => bail!("Unknown catalog button '{}'", other),
    };

    world
        .record(format!("Botón esperado: {}, Cambió: {}", expected, changed))
        .await;
    ensure!(changed, "Button for '{}' does not show '{}'", product, expected);
    Ok(())
}

#[then(expr = "el contador del carrito debería incrementar en {int}")]
async fn cart_count_increments(world: &mut ShopWorld, increment: usize) -> anyhow::Result<()> {
    let current = world.pages()?.inventory.cart_items_count().await;
    let expected = world.cart_count + increment;
    world
        .record(format!("Items en carrito: {}, esperado: {}", current, expected))
        .await;
    ensure!(
        current == expected,
        "Cart count is {}, expected {} + {}",
        current,
        world.cart_count,
        increment
    );
    Ok(())
}

#[when(expr = "el usuario presiona el ícono del carrito")]
async fn press_cart_icon(world: &mut ShopWorld) -> anyhow::Result<()> {
    world.pages()?.inventory.click_cart_icon().await?;
    world.record("Ícono del carrito presionado").await;
    Ok(())
}
