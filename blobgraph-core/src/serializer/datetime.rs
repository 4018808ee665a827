// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Date-times, dates and spans.
//!
//! A date-time is written as `YYYY-MM-DDTHH:MM:SS.fffffffff|Kind` where the kind tag
//! records whether the wall time is local, unspecified or UTC. Spans are written as
//! signed `seconds.nanoseconds`.

use crate::error::Error;
use crate::serializer::parse_failure;
use crate::types::PrimitiveKind;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::time::Duration as StdDuration;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const DATE_TIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";
const KIND_SEPARATOR: char = '|';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateTimeKind {
    Local,
    Unspecified,
    Utc,
}

impl DateTimeKind {
    fn tag(self) -> &'static str {
        match self {
            DateTimeKind::Local => "Local",
            DateTimeKind::Unspecified => "Unspecified",
            DateTimeKind::Utc => "Utc",
        }
    }

    fn from_tag(tag: &str) -> Option<DateTimeKind> {
        match tag {
            "Local" => Some(DateTimeKind::Local),
            "Unspecified" => Some(DateTimeKind::Unspecified),
            "Utc" => Some(DateTimeKind::Utc),
            _ => None,
        }
    }
}

fn format_tagged(naive: &NaiveDateTime, kind: DateTimeKind) -> String {
    format!("{}{KIND_SEPARATOR}{}", naive.format(DATE_TIME_FORMAT), kind.tag())
}

fn parse_tagged<T>(text: &str) -> Result<(NaiveDateTime, DateTimeKind), Error> {
    let (stamp, kind) = match text.split_once(KIND_SEPARATOR) {
        Some((stamp, tag)) => {
            let kind = DateTimeKind::from_tag(tag)
                .ok_or_else(|| parse_failure::<T>(text, format!("unknown kind `{tag}`")))?;
            (stamp, kind)
        }
        None => (text, DateTimeKind::Unspecified),
    };
    let naive = NaiveDateTime::parse_from_str(stamp, DATE_TIME_PARSE_FORMAT)
        .map_err(|e| parse_failure::<T>(text, e))?;
    Ok((naive, kind))
}

fn local_from_naive<T>(naive: &NaiveDateTime, text: &str) -> Result<DateTime<Local>, Error> {
    Local
        .from_local_datetime(naive)
        .earliest()
        .ok_or_else(|| parse_failure::<T>(text, "wall time does not exist in the local zone"))
}

fn naive_to_text(v: &NaiveDateTime) -> Result<String, Error> {
    Ok(format_tagged(v, DateTimeKind::Unspecified))
}

/// An unspecified date-time keeps whatever wall time was stored.
fn naive_from_text(text: &str) -> Result<NaiveDateTime, Error> {
    parse_tagged::<NaiveDateTime>(text).map(|(naive, _)| naive)
}

impl_primitive!(
    NaiveDateTime,
    PrimitiveKind::DateTime,
    NaiveDateTime::default(),
    naive_to_text,
    naive_from_text
);

fn utc_to_text(v: &DateTime<Utc>) -> Result<String, Error> {
    Ok(format_tagged(&v.naive_utc(), DateTimeKind::Utc))
}

fn utc_from_text(text: &str) -> Result<DateTime<Utc>, Error> {
    let (naive, kind) = parse_tagged::<DateTime<Utc>>(text)?;
    match kind {
        DateTimeKind::Utc | DateTimeKind::Unspecified => Ok(Utc.from_utc_datetime(&naive)),
        DateTimeKind::Local => {
            local_from_naive::<DateTime<Utc>>(&naive, text).map(|t| t.with_timezone(&Utc))
        }
    }
}

impl_primitive!(
    DateTime<Utc>,
    PrimitiveKind::DateTime,
    DateTime::<Utc>::default(),
    utc_to_text,
    utc_from_text
);

fn local_to_text(v: &DateTime<Local>) -> Result<String, Error> {
    Ok(format_tagged(&v.naive_local(), DateTimeKind::Local))
}

fn local_from_text(text: &str) -> Result<DateTime<Local>, Error> {
    let (naive, kind) = parse_tagged::<DateTime<Local>>(text)?;
    match kind {
        DateTimeKind::Local | DateTimeKind::Unspecified => {
            local_from_naive::<DateTime<Local>>(&naive, text)
        }
        DateTimeKind::Utc => Ok(Utc.from_utc_datetime(&naive).with_timezone(&Local)),
    }
}

impl_primitive!(
    DateTime<Local>,
    PrimitiveKind::DateTime,
    DateTime::<Local>::default(),
    local_to_text,
    local_from_text
);

fn date_to_text(v: &NaiveDate) -> Result<String, Error> {
    Ok(v.format(DATE_FORMAT).to_string())
}

fn date_from_text(text: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| parse_failure::<NaiveDate>(text, e))
}

impl_primitive!(
    NaiveDate,
    PrimitiveKind::Date,
    NaiveDate::default(),
    date_to_text,
    date_from_text
);

fn split_span<T>(text: &str) -> Result<(bool, u64, u32), Error> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (secs, nanos) = body.split_once('.').unwrap_or((body, "0"));
    let secs = secs
        .parse::<u64>()
        .map_err(|e| parse_failure::<T>(text, e))?;
    if nanos.is_empty() || nanos.len() > 9 || !nanos.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_failure::<T>(text, "bad fractional seconds"));
    }
    // right-pad to nanoseconds: ".5" is half a second
    let scale = 10u32.pow(9 - nanos.len() as u32);
    let nanos = nanos
        .parse::<u32>()
        .map_err(|e| parse_failure::<T>(text, e))?
        * scale;
    Ok((negative, secs, nanos))
}

fn span_to_text(v: &chrono::Duration) -> Result<String, Error> {
    let secs = v.num_seconds();
    let nanos = v.subsec_nanos();
    let sign = if secs < 0 || nanos < 0 { "-" } else { "" };
    Ok(format!(
        "{sign}{}.{:09}",
        secs.unsigned_abs(),
        nanos.unsigned_abs()
    ))
}

fn span_from_text(text: &str) -> Result<chrono::Duration, Error> {
    let (negative, secs, nanos) = split_span::<chrono::Duration>(text)?;
    let secs = i64::try_from(secs).map_err(|e| parse_failure::<chrono::Duration>(text, e))?;
    let whole = chrono::Duration::try_seconds(secs)
        .ok_or_else(|| parse_failure::<chrono::Duration>(text, "span out of range"))?;
    let span = whole
        .checked_add(&chrono::Duration::nanoseconds(nanos as i64))
        .ok_or_else(|| parse_failure::<chrono::Duration>(text, "span out of range"))?;
    Ok(if negative { -span } else { span })
}

impl_primitive!(
    chrono::Duration,
    PrimitiveKind::Span,
    chrono::Duration::zero(),
    span_to_text,
    span_from_text
);

fn std_span_to_text(v: &StdDuration) -> Result<String, Error> {
    Ok(format!("{}.{:09}", v.as_secs(), v.subsec_nanos()))
}

fn std_span_from_text(text: &str) -> Result<StdDuration, Error> {
    let (negative, secs, nanos) = split_span::<StdDuration>(text)?;
    if negative {
        return Err(parse_failure::<StdDuration>(text, "negative span"));
    }
    Ok(StdDuration::new(secs, nanos))
}

impl_primitive!(
    StdDuration,
    PrimitiveKind::Span,
    StdDuration::ZERO,
    std_span_to_text,
    std_span_from_text
);
