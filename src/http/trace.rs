use {
	axum::{
		extract::ConnectInfo,
		http::{HeaderMap, Request, Response},
	},
	std::{net::SocketAddr, time::Duration},
	tower_http::{
		classify::ServerErrorsFailureClass,
		trace::{HttpMakeClassifier, MakeSpan, OnEos, OnFailure, OnRequest, OnResponse, TraceLayer},
	},
};

pub(crate) fn layer<ReqBody, ResBody>() -> TraceLayer<
	HttpMakeClassifier,
	impl MakeSpan<ReqBody> + Clone,
	impl OnRequest<ReqBody> + Clone,
	impl OnResponse<ResBody> + Clone,
	tower_http::trace::DefaultOnBodyChunk,
	impl OnEos + Clone,
	impl OnFailure<ServerErrorsFailureClass> + Clone,
>
{
	TraceLayer::new_for_http()
		.make_span_with(make_span::<ReqBody>)
		.on_request(on_request::<ReqBody>)
		.on_response(on_response::<ResBody>)
		.on_eos(on_eos)
		.on_failure(on_failure)
}

fn make_span<B>(req: &Request<B>) -> tracing::Span
{
	let span = tracing::info_span!(
		target: "superside::http",
		"request",
		req.method = %req.method(),
		req.uri = %req.uri(),
		req.peer_addr = tracing::field::Empty,
		res.status = tracing::field::Empty,
	);

	if let Some(ConnectInfo(peer_addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
		span.record("req.peer_addr", tracing::field::display(peer_addr));
	}

	span
}

fn on_request<B>(_req: &Request<B>, _span: &tracing::Span)
{
	tracing::debug!(target: "superside::http", "starting to process request");
}

fn on_response<B>(res: &Response<B>, latency: Duration, span: &tracing::Span)
{
	span.record("res.status", res.status().as_u16());

	tracing::info!(target: "superside::http", ?latency, "finished processing request");
}

fn on_eos(trailers: Option<&HeaderMap>, stream_duration: Duration, _span: &tracing::Span)
{
	tracing::trace!(
		target: "superside::http::response::body",
		?trailers,
		?stream_duration,
		"reached end of body stream",
	);
}

fn on_failure(failure_class: ServerErrorsFailureClass, latency: Duration, _span: &tracing::Span)
{
	match failure_class {
		ServerErrorsFailureClass::StatusCode(status) => {
			tracing::error!(
				target: "superside::http::error",
				status = status.as_u16(),
				?latency,
				"request failed",
			);
		},
		ServerErrorsFailureClass::Error(error) => {
			tracing::error!(target: "superside::http::error", %error, ?latency, "request failed");
		},
	}
}
