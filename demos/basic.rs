use layered_http::{create_client, ClientOptions, DefaultHeaders, Method, RequestConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = ClientOptions::from_env().map_err(anyhow::Error::msg)?;
    let base_url = options
        .base_url
        .clone()
        .unwrap_or_else(|| "https://httpbin.org".to_owned());

    let client = create_client(
        options.with_base_url(base_url).with_headers(
            DefaultHeaders::new()
                .header("Accept", "application/json")
                .common("X-Client", "layered-http-demo")
                .for_method(Method::Post, "X-Idempotency-Key", "demo-1"),
        ),
    );

    let response = client
        .get(
            "/get",
            RequestConfig::new().query("page", "1").retry(2).retry_delay_ms(100),
        )
        .await?;
    println!("GET {} {}", response.status, response.status_text);

    let response = client
        .post(
            "/post",
            &[("user", "demo"), ("pass", "secret")],
            RequestConfig::new().header("Content-Type", "application/x-www-form-urlencoded"),
        )
        .await?;
    println!("POST {}: {}", response.status, response.data);

    Ok(())
}
