#[rocket::launch]
fn rocket() -> _ {
    let rocket = jupiter_api::rocket();
    log::info!("Starting Jupiter job search API");
    rocket
}
