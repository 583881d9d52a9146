#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    barangay_voucher_server::run().await
}
