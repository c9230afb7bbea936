#[actix_web::main]
async fn main() -> std::io::Result<()> {
    kiosk_print_server::run().await
}
