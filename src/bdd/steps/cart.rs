use anyhow::{bail, ensure};
use cucumber::{then, when};

use super::buttons;
use crate::bdd::world::{ErrorScreen, ShopWorld};
use crate::pages::Screen;

#[then(expr = "debería ser redirigido a la página del carrito")]
async fn redirected_to_cart(world: &mut ShopWorld) -> anyhow::Result<()> {
    world.pages()?.cart.wait_until_loaded().await?;
    world.record("Redirección a la página del carrito").await;
    Ok(())
}

#[then(expr = "debería ver los productos seleccionados en el carrito")]
async fn sees_selected_products(world: &mut ShopWorld) -> anyhow::Result<()> {
    let items = world.pages()?.cart.cart_items().await?;
    world
        .record(format!("Productos en el carrito: {}", items.join(", ")))
        .await;

    ensure!(!items.is_empty(), "The cart is empty");
    for product in &world.cart_products {
        ensure!(items.contains(product), "'{}' is missing from the cart", product);
    }
    Ok(())
}

#[when(expr = "el usuario presiona el botón {string} para el producto {string}")]
async fn press_row_button(world: &mut ShopWorld, label: String, product: String) -> anyhow::Result<()> {
    if label != buttons::REMOVE {
        bail!("Unknown cart row button '{}'", label);
    }

    let cart = world.pages()?.cart.clone();
    world.cart_count = cart.cart_items_count().await;
    cart.remove_product(&product).await?;
    world.cart_products.retain(|p| p != &product);
    world.record(format!("Producto removido: {}", product)).await;
    Ok(())
}

#[then(expr = "el producto {string} debería ser removido del carrito")]
async fn product_removed(world: &mut ShopWorld, product: String) -> anyhow::Result<()> {
    let still_there = world.pages()?.cart.is_product_in_cart(&product).await?;
    world
        .record(format!("Producto: {}, Removido: {}", product, !still_there))
        .await;
    ensure!(!still_there, "'{}' is still in the cart", product);
    Ok(())
}

#[then(expr = "el contador del carrito debería decrementar en {int}")]
async fn cart_count_decrements(world: &mut ShopWorld, decrement: usize) -> anyhow::Result<()> {
    let current = world.pages()?.cart.cart_items_count().await;
    let Some(expected) = world.cart_count.checked_sub(decrement) else {
        bail!("Cart held {} items, cannot drop by {}", world.cart_count, decrement);
    };
    world
        .record(format!("Items en carrito: {}, esperado: {}", current, expected))
        .await;
    ensure!(
        current == expected,
        "Cart count is {}, expected {} - {}",
        current,
        world.cart_count,
        decrement
    );
    Ok(())
}

#[when(expr = "el usuario presiona el botón {string}")]
async fn press_button(world: &mut ShopWorld, label: String) -> anyhow::Result<()> {
    let pages = world.pages()?.clone();
    match label.as_str() {
        buttons::CHECKOUT => pages.cart.click_checkout().await?,
        buttons::CONTINUE => {
            pages.checkout.click_continue().await?;
            world.error_screen = ErrorScreen::Checkout;
        }
        other => bail!("Unknown button '{}'", other),
    }
    world.record(format!("Botón presionado: {}", label)).await;
    Ok(())
}
